//! Execution semantics.
//!
//! Pure functions evaluating the integer and floating-point instruction
//! families. The functional units in `core::fu` call into these when an
//! operation's latency expires.

/// Integer arithmetic, logical, shift, and compare operations.
pub mod alu;
/// IEEE-754 double-precision floating-point operations.
pub mod fpu;
