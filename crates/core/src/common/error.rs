//! Configuration error definitions.
//!
//! Configuration errors are the caller's fault and are rejected at
//! construction with a descriptive value; no simulation proceeds. Runtime
//! anomalies (divide-by-zero, out-of-bounds accesses) are not errors; they
//! surface as warnings in the cycle log.

use std::fmt;

/// A rejected simulator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Cache size is not a power of two. The associated value is the size.
    CacheSizeNotPowerOfTwo(usize),

    /// Block size is not a power of two. The associated value is the size.
    BlockSizeNotPowerOfTwo(usize),

    /// Block size exceeds the total cache size.
    BlockLargerThanCache {
        /// Configured block size in bytes.
        block: usize,
        /// Configured cache size in bytes.
        cache: usize,
    },

    /// A station, buffer, or unit pool was configured with zero entries.
    /// The associated value names the pool.
    EmptyPool(&'static str),

    /// A latency was configured as zero cycles. The associated value names
    /// the latency field.
    ZeroLatency(&'static str),

    /// Backing memory was configured with zero bytes.
    ZeroMemorySize,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CacheSizeNotPowerOfTwo(size) => {
                write!(f, "cache size must be a power of two, got {}", size)
            }
            ConfigError::BlockSizeNotPowerOfTwo(size) => {
                write!(f, "block size must be a power of two, got {}", size)
            }
            ConfigError::BlockLargerThanCache { block, cache } => {
                write!(
                    f,
                    "block size ({}) cannot exceed cache size ({})",
                    block, cache
                )
            }
            ConfigError::EmptyPool(pool) => {
                write!(f, "pool '{}' must have at least one entry", pool)
            }
            ConfigError::ZeroLatency(field) => {
                write!(f, "latency '{}' must be at least one cycle", field)
            }
            ConfigError::ZeroMemorySize => write!(f, "memory size must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
