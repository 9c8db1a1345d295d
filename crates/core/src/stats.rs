//! Simulation statistics collection and reporting.
//!
//! This module tracks aggregate metrics for a simulation run. It provides:
//! 1. **Cycle and issue counts:** Total cycles, instructions issued, stall cycles by cause.
//! 2. **CDB traffic:** Broadcasts performed and messages deferred by contention.
//! 3. **Memory:** Loads completed and stores committed.
//! 4. **Branches:** Evaluations and taken counts.
//! 5. **Anomalies:** Integer divide-by-zero substitutions.
//!
//! Cache hit/miss/write-back counters live with the cache itself and are
//! combined into the report by the simulator facade.

/// Aggregate statistics for one simulation run.
#[derive(Clone, Debug, Default)]
pub struct SimStats {
    /// Total cycles stepped.
    pub cycles: u64,
    /// Instructions issued from the queue.
    pub instructions_issued: u64,

    /// Issue stalls due to a full station, buffer, or address-unit pool.
    pub stalls_structural: u64,
    /// Issue stalls while a branch was pending or taken this cycle.
    pub stalls_branch: u64,
    /// Issue stalls while a memory op's base register had a pending producer.
    pub stalls_data: u64,

    /// Messages broadcast on the CDB.
    pub cdb_broadcasts: u64,
    /// Ready messages deferred to a later cycle by contention.
    pub cdb_deferred: u64,

    /// Loads that completed their memory access.
    pub loads_completed: u64,
    /// Stores committed to the cache.
    pub stores_committed: u64,

    /// Branches evaluated.
    pub branches_evaluated: u64,
    /// Branches evaluated as taken.
    pub branches_taken: u64,

    /// Integer divides by zero substituted with 0.
    pub int_divide_by_zero: u64,
}

impl SimStats {
    /// Issued instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_issued as f64 / self.cycles as f64
        }
    }

    /// Prints a human-readable summary to stdout.
    pub fn print(&self) {
        println!("=== Simulation Statistics ===");
        println!("  Cycles:              {}", self.cycles);
        println!("  Instructions issued: {}", self.instructions_issued);
        println!("  IPC:                 {:.3}", self.ipc());
        println!(
            "  Issue stalls:        {} structural, {} branch, {} data",
            self.stalls_structural, self.stalls_branch, self.stalls_data
        );
        println!(
            "  CDB:                 {} broadcasts, {} deferred",
            self.cdb_broadcasts, self.cdb_deferred
        );
        println!(
            "  Memory:              {} loads, {} stores",
            self.loads_completed, self.stores_committed
        );
        println!(
            "  Branches:            {} evaluated, {} taken",
            self.branches_evaluated, self.branches_taken
        );
        if self.int_divide_by_zero > 0 {
            println!("  Integer div-by-zero: {}", self.int_divide_by_zero);
        }
    }
}
