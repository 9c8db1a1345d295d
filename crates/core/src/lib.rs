//! Cycle-accurate Tomasulo dynamic-scheduling simulator core.
//!
//! This crate implements the out-of-order core of a Tomasulo simulator for a
//! MIPS-like instruction subset, with the following:
//! 1. **Core:** Reservation stations, load/store buffers, branch handlers, and the per-cycle scheduler.
//! 2. **Memory:** Byte-addressable main memory behind a direct-mapped write-back data cache.
//! 3. **ISA:** A closed opcode set (loads, stores, integer ALU, FP add/sub, FP mul/div, branches).
//! 4. **Broadcast:** The single-writer Common Data Bus with dependency-informed arbitration.
//! 5. **Simulation:** Configuration, initial state, per-cycle snapshots, and statistics.
//!
//! The caller supplies a program (a list of [`isa::Instruction`]) and a
//! [`CoreConfig`], steps the [`Simulator`], and observes immutable
//! [`snapshot::CycleSnapshot`] records. The core performs no I/O of its own.

/// Common types (tags, registers, configuration errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Microarchitectural structures and the per-cycle scheduler.
pub mod core;
/// Instruction set (opcodes, instruction records, classification).
pub mod isa;
/// Main memory and the direct-mapped write-back data cache.
pub mod mem;
/// Instruction queue (in-order frontend).
pub mod queue;
/// Top-level simulator facade and initial state.
pub mod sim;
/// Immutable per-cycle snapshot records.
pub mod snapshot;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Execution semantics for the integer and floating-point families.
pub mod units;

/// Root configuration type; use `CoreConfig::default()` or deserialize from JSON.
pub use crate::config::CoreConfig;
/// Top-level simulator; construct with `Simulator::new`, then `step` or `run`.
pub use crate::sim::Simulator;
