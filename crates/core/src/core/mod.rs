//! Microarchitectural structures and the per-cycle scheduler.
//!
//! Each structure is a small finite state machine advanced once per cycle by
//! the engine, in a fixed phase order:
//! 1. **Stations:** Reservation stations for the three ALU families.
//! 2. **Buffers:** Load and store buffers with program-order sequence numbers.
//! 3. **Units:** Functional units and address units with counted-down latency.
//! 4. **Branch:** The stall-on-branch resolution path.
//! 5. **CDB:** Single-writer broadcast with dependency-informed arbitration.
//! 6. **Engine:** The per-cycle orchestrator tying the phases together.

/// Effective-address units.
pub mod address_unit;
/// Branch handlers (BEQ/BNE).
pub mod branch;
/// Common Data Bus messages and arbitration.
pub mod cdb;
/// The per-cycle scheduler.
pub mod engine;
/// Functional units (integer ALU, FP add/sub, FP mul/div).
pub mod fu;
/// Load buffers.
pub mod load_buffer;
/// Memory-ordering predicates between loads and stores.
pub mod ordering;
/// Reservation stations.
pub mod station;
/// Store buffers.
pub mod store_buffer;

pub use engine::CycleEngine;
