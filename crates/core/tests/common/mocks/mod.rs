//! Mock implementations of core seams.

/// A `mockall` mock of the `Memory` trait.
pub mod memory;
