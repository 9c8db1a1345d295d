//! Memory hierarchy: byte-addressable main memory behind a direct-mapped
//! write-back data cache.
//!
//! Only data accesses are modeled; instruction fetch has no timing. The
//! load/store buffers reach memory exclusively through the [`Memory`] trait,
//! which both [`MainMemory`] and [`DataCache`] implement.

/// Direct-mapped write-back, write-allocate data cache.
pub mod cache;
/// Byte-addressable backing store.
pub mod main_memory;
/// The memory access trait shared by cache and backing store.
pub mod traits;

pub use cache::DataCache;
pub use main_memory::MainMemory;
pub use traits::Memory;
