//! End-to-end suites.

mod invariants;
mod laws;
mod memory_seam;
mod scenarios;
