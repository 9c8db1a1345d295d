//! Common types shared across the core.
//!
//! This module collects the small leaf types every other module depends on:
//! 1. **Tags:** Producer identities carried on the Common Data Bus.
//! 2. **Registers:** The unified integer + floating-point register file.
//! 3. **Errors:** Construction-time configuration errors.

/// Configuration error type returned at simulator construction.
pub mod error;
/// Unified register file with per-register producer tags.
pub mod reg;
/// Producer tags identifying in-flight stations and buffers.
pub mod tag;

pub use error::ConfigError;
pub use reg::{Register, RegisterFile};
pub use tag::{Tag, TagClass};
