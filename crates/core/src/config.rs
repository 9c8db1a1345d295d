//! Configuration system for the simulator core.
//!
//! This module defines all configuration structures used to parameterize the
//! core. It provides:
//! 1. **Defaults:** Baseline hardware constants (pools, latencies, cache, memory).
//! 2. **Structures:** Hierarchical config for general, pools, latencies, cache, and memory.
//! 3. **Validation:** Construction-time checks that reject impossible configurations.
//!
//! Configuration is supplied as JSON by an external front-end, or use
//! `CoreConfig::default()` directly.

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the core.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Number of FP add/sub reservation stations.
    pub const NUM_FP_ADD_SUB_RS: usize = 3;

    /// Number of FP mul/div reservation stations.
    pub const NUM_FP_MUL_DIV_RS: usize = 3;

    /// Number of integer ALU reservation stations.
    pub const NUM_INT_RS: usize = 3;

    /// Number of load buffers.
    pub const NUM_LOAD_BUFFERS: usize = 2;

    /// Number of store buffers.
    pub const NUM_STORE_BUFFERS: usize = 2;

    /// Number of branch handlers. One suffices: only a single branch may
    /// be in flight at a time.
    pub const NUM_BRANCH_HANDLERS: usize = 1;

    /// Number of concurrent effective-address computations.
    pub const NUM_ADDRESS_UNITS: usize = 2;

    /// Integer ALU latency in cycles.
    pub const INT_ALU_LATENCY: u64 = 1;

    /// FP add/sub latency in cycles.
    pub const FP_ADD_SUB_LATENCY: u64 = 2;

    /// FP multiply latency in cycles.
    pub const FP_MUL_LATENCY: u64 = 10;

    /// FP divide latency in cycles.
    pub const FP_DIV_LATENCY: u64 = 40;

    /// Effective-address computation latency in cycles.
    pub const ADDRESS_LATENCY: u64 = 1;

    /// Branch evaluation latency in cycles.
    pub const BRANCH_LATENCY: u64 = 1;

    /// Total data cache size in bytes.
    pub const CACHE_SIZE: usize = 256;

    /// Cache block size in bytes.
    pub const BLOCK_SIZE: usize = 8;

    /// Cache hit latency in cycles.
    pub const CACHE_HIT_LATENCY: u64 = 1;

    /// Additional cycles incurred on a cache miss.
    pub const CACHE_MISS_PENALTY: u64 = 10;

    /// Bytes of backing main memory (64 KiB).
    pub const MEMORY_SIZE: usize = 65536;
}

/// Root configuration structure containing all core settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use tomasim_core::config::CoreConfig;
///
/// let config = CoreConfig::default();
/// assert_eq!(config.pools.num_load_buffers, 2);
/// assert_eq!(config.cache.block_size, 8);
/// assert!(config.validate().is_ok());
/// ```
///
/// Deserializing from JSON (typical front-end usage):
///
/// ```
/// use tomasim_core::config::CoreConfig;
///
/// let json = r#"{
///     "pools": { "num_int_rs": 4 },
///     "latency": { "fp_div": 20 },
///     "cache": { "cache_size": 1024, "block_size": 64 },
///     "memory": { "memory_size": 131072 }
/// }"#;
///
/// let config: CoreConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.pools.num_int_rs, 4);
/// assert_eq!(config.latency.fp_div, 20);
/// assert_eq!(config.cache.cache_size, 1024);
/// assert_eq!(config.pools.num_load_buffers, 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreConfig {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Station, buffer, and unit pool sizes.
    #[serde(default)]
    pub pools: PoolConfig,
    /// Per-operation latencies.
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Data cache geometry and timing.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Backing memory configuration.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl CoreConfig {
    /// Validates the configuration.
    ///
    /// Rejects non-power-of-two cache geometry, empty pools, zero latencies,
    /// and zero-sized memory. Called by `Simulator::new` before any structure
    /// is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pools.validate()?;
        self.latency.validate()?;
        self.cache.validate()?;
        self.memory.validate()
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Mirror each cycle's log lines to stderr as they are produced.
    #[serde(default)]
    pub trace_log: bool,
}

/// Station, buffer, and unit pool sizes. Each pool must hold at least one entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// FP add/sub reservation stations (tags `A1..`).
    #[serde(default = "PoolConfig::default_fp_add_sub_rs")]
    pub num_fp_add_sub_rs: usize,

    /// FP mul/div reservation stations (tags `M1..`).
    #[serde(default = "PoolConfig::default_fp_mul_div_rs")]
    pub num_fp_mul_div_rs: usize,

    /// Integer ALU reservation stations (tags `I1..`).
    #[serde(default = "PoolConfig::default_int_rs")]
    pub num_int_rs: usize,

    /// Load buffers (tags `L1..`).
    #[serde(default = "PoolConfig::default_load_buffers")]
    pub num_load_buffers: usize,

    /// Store buffers (tags `S1..`).
    #[serde(default = "PoolConfig::default_store_buffers")]
    pub num_store_buffers: usize,

    /// Branch handlers (tags `B1..`).
    #[serde(default = "PoolConfig::default_branch_handlers")]
    pub num_branch_handlers: usize,

    /// Address units for concurrent effective-address computation.
    #[serde(default = "PoolConfig::default_address_units")]
    pub num_address_units: usize,
}

impl PoolConfig {
    /// Returns the default FP add/sub station count.
    fn default_fp_add_sub_rs() -> usize {
        defaults::NUM_FP_ADD_SUB_RS
    }

    /// Returns the default FP mul/div station count.
    fn default_fp_mul_div_rs() -> usize {
        defaults::NUM_FP_MUL_DIV_RS
    }

    /// Returns the default integer station count.
    fn default_int_rs() -> usize {
        defaults::NUM_INT_RS
    }

    /// Returns the default load buffer count.
    fn default_load_buffers() -> usize {
        defaults::NUM_LOAD_BUFFERS
    }

    /// Returns the default store buffer count.
    fn default_store_buffers() -> usize {
        defaults::NUM_STORE_BUFFERS
    }

    /// Returns the default branch handler count.
    fn default_branch_handlers() -> usize {
        defaults::NUM_BRANCH_HANDLERS
    }

    /// Returns the default address unit count.
    fn default_address_units() -> usize {
        defaults::NUM_ADDRESS_UNITS
    }

    /// Rejects any empty pool.
    fn validate(&self) -> Result<(), ConfigError> {
        let pools = [
            (self.num_fp_add_sub_rs, "fp_add_sub_rs"),
            (self.num_fp_mul_div_rs, "fp_mul_div_rs"),
            (self.num_int_rs, "int_rs"),
            (self.num_load_buffers, "load_buffers"),
            (self.num_store_buffers, "store_buffers"),
            (self.num_branch_handlers, "branch_handlers"),
            (self.num_address_units, "address_units"),
        ];
        for (size, name) in pools {
            if size == 0 {
                return Err(ConfigError::EmptyPool(name));
            }
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_fp_add_sub_rs: defaults::NUM_FP_ADD_SUB_RS,
            num_fp_mul_div_rs: defaults::NUM_FP_MUL_DIV_RS,
            num_int_rs: defaults::NUM_INT_RS,
            num_load_buffers: defaults::NUM_LOAD_BUFFERS,
            num_store_buffers: defaults::NUM_STORE_BUFFERS,
            num_branch_handlers: defaults::NUM_BRANCH_HANDLERS,
            num_address_units: defaults::NUM_ADDRESS_UNITS,
        }
    }
}

/// Per-operation latencies in cycles. Every latency must be positive.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyConfig {
    /// Integer ALU operations.
    #[serde(default = "LatencyConfig::default_int_alu")]
    pub int_alu: u64,

    /// FP add and subtract.
    #[serde(default = "LatencyConfig::default_fp_add_sub")]
    pub fp_add_sub: u64,

    /// FP multiply.
    #[serde(default = "LatencyConfig::default_fp_mul")]
    pub fp_mul: u64,

    /// FP divide.
    #[serde(default = "LatencyConfig::default_fp_div")]
    pub fp_div: u64,

    /// Effective-address computation.
    #[serde(default = "LatencyConfig::default_address")]
    pub address: u64,

    /// Branch evaluation.
    #[serde(default = "LatencyConfig::default_branch")]
    pub branch: u64,
}

impl LatencyConfig {
    /// Returns the default integer ALU latency.
    fn default_int_alu() -> u64 {
        defaults::INT_ALU_LATENCY
    }

    /// Returns the default FP add/sub latency.
    fn default_fp_add_sub() -> u64 {
        defaults::FP_ADD_SUB_LATENCY
    }

    /// Returns the default FP multiply latency.
    fn default_fp_mul() -> u64 {
        defaults::FP_MUL_LATENCY
    }

    /// Returns the default FP divide latency.
    fn default_fp_div() -> u64 {
        defaults::FP_DIV_LATENCY
    }

    /// Returns the default address computation latency.
    fn default_address() -> u64 {
        defaults::ADDRESS_LATENCY
    }

    /// Returns the default branch evaluation latency.
    fn default_branch() -> u64 {
        defaults::BRANCH_LATENCY
    }

    /// Rejects any zero latency.
    fn validate(&self) -> Result<(), ConfigError> {
        let latencies = [
            (self.int_alu, "int_alu"),
            (self.fp_add_sub, "fp_add_sub"),
            (self.fp_mul, "fp_mul"),
            (self.fp_div, "fp_div"),
            (self.address, "address"),
            (self.branch, "branch"),
        ];
        for (cycles, name) in latencies {
            if cycles == 0 {
                return Err(ConfigError::ZeroLatency(name));
            }
        }
        Ok(())
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            int_alu: defaults::INT_ALU_LATENCY,
            fp_add_sub: defaults::FP_ADD_SUB_LATENCY,
            fp_mul: defaults::FP_MUL_LATENCY,
            fp_div: defaults::FP_DIV_LATENCY,
            address: defaults::ADDRESS_LATENCY,
            branch: defaults::BRANCH_LATENCY,
        }
    }
}

/// Data cache geometry and timing.
///
/// Size and block size must be powers of two with `block_size <= cache_size`.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub cache_size: usize,

    /// Block (line) size in bytes.
    #[serde(default = "CacheConfig::default_block")]
    pub block_size: usize,

    /// Access latency on a hit, in cycles.
    #[serde(default = "CacheConfig::default_hit_latency")]
    pub hit_latency: u64,

    /// Additional cycles incurred on a miss.
    #[serde(default = "CacheConfig::default_miss_penalty")]
    pub miss_penalty: u64,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default block size in bytes.
    fn default_block() -> usize {
        defaults::BLOCK_SIZE
    }

    /// Returns the default hit latency in cycles.
    fn default_hit_latency() -> u64 {
        defaults::CACHE_HIT_LATENCY
    }

    /// Returns the default miss penalty in cycles.
    fn default_miss_penalty() -> u64 {
        defaults::CACHE_MISS_PENALTY
    }

    /// Rejects non-power-of-two geometry and oversized blocks.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.cache_size.is_power_of_two() {
            return Err(ConfigError::CacheSizeNotPowerOfTwo(self.cache_size));
        }
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(self.block_size));
        }
        if self.block_size > self.cache_size {
            return Err(ConfigError::BlockLargerThanCache {
                block: self.block_size,
                cache: self.cache_size,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_size: defaults::CACHE_SIZE,
            block_size: defaults::BLOCK_SIZE,
            hit_latency: defaults::CACHE_HIT_LATENCY,
            miss_penalty: defaults::CACHE_MISS_PENALTY,
        }
    }
}

/// Backing main memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Bytes of byte-addressable backing memory.
    #[serde(default = "MemoryConfig::default_size")]
    pub memory_size: usize,
}

impl MemoryConfig {
    /// Returns the default memory size in bytes.
    fn default_size() -> usize {
        defaults::MEMORY_SIZE
    }

    /// Rejects zero-sized memory.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size == 0 {
            return Err(ConfigError::ZeroMemorySize);
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_size: defaults::MEMORY_SIZE,
        }
    }
}
