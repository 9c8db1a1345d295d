//! Simulator construction, stepping, and terminal-state inspection.

use std::collections::BTreeMap;

use crate::common::error::ConfigError;
use crate::common::reg::RegisterFile;
use crate::config::CoreConfig;
use crate::core::engine::CycleEngine;
use crate::isa::Instruction;
use crate::snapshot::CycleSnapshot;
use crate::stats::SimStats;

/// Sparse initial values for registers and memory.
///
/// Register keys are flat indices (`0..32` integer, `32..64` FP); memory
/// keys are byte addresses of doubles. Applied once, before the first step.
#[derive(Clone, Debug, Default)]
pub struct InitialState {
    /// Register index to initial value.
    pub registers: BTreeMap<usize, f64>,
    /// Byte address to initial double value.
    pub memory: BTreeMap<u64, f64>,
}

impl InitialState {
    /// Creates an empty initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a register's initial value.
    pub fn with_register(mut self, index: usize, value: f64) -> Self {
        self.registers.insert(index, value);
        self
    }

    /// Sets a memory double's initial value.
    pub fn with_memory(mut self, addr: u64, value: f64) -> Self {
        self.memory.insert(addr, value);
        self
    }
}

/// Result of a capped run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// True when the program drained before the cap was reached.
    pub finished: bool,
    /// Cycles stepped in total.
    pub cycles: u64,
}

/// The top-level simulator: a validated configuration plus the cycle engine.
pub struct Simulator {
    engine: CycleEngine,
}

impl Simulator {
    /// Builds a simulator for `program` under `config`.
    ///
    /// The configuration is validated first; an invalid one is rejected
    /// before any structure is built.
    pub fn new(program: Vec<Instruction>, config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: CycleEngine::new(program, config),
        })
    }

    /// Applies sparse initial register and memory values.
    ///
    /// Memory values land in the backing store directly, not the cache, so
    /// the first access to them is an honest miss.
    pub fn apply_initial_state(&mut self, init: &InitialState) {
        for (&index, &value) in &init.registers {
            self.engine.regs_mut().write(index, value);
        }
        for (&addr, &value) in &init.memory {
            use crate::mem::traits::Memory as _;
            self.engine.cache_mut().memory_mut().store_double(addr, value);
        }
    }

    /// Advances one cycle and returns its snapshot.
    pub fn step(&mut self) -> CycleSnapshot {
        self.engine.step()
    }

    /// True when the queue is empty, nothing is busy, and no branch is pending.
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// Steps until finished or `max_cycles` is reached.
    ///
    /// The core cannot detect infinite loops itself; the cap is the caller's
    /// safety limit.
    pub fn run(&mut self, max_cycles: u64) -> RunOutcome {
        let mut cycles = self.engine.cycle();
        while !self.engine.is_finished() && cycles < max_cycles {
            self.engine.step();
            cycles = self.engine.cycle();
        }
        RunOutcome {
            finished: self.engine.is_finished(),
            cycles,
        }
    }

    /// The register file.
    pub fn registers(&self) -> &RegisterFile {
        self.engine.regs()
    }

    /// Reads an integer register's terminal value.
    pub fn read_int(&self, index: usize) -> i64 {
        self.engine.regs().read_int(index)
    }

    /// Reads a floating-point register's terminal value by `Fn` number.
    pub fn read_fp(&self, n: usize) -> f64 {
        self.engine.regs().read(crate::common::reg::fp(n))
    }

    /// Reads a double from the memory system without disturbing it.
    ///
    /// Sees through the cache: dirty lines take precedence over the backing
    /// store, so the terminal view is coherent without a flush.
    pub fn memory_double(&self, addr: u64) -> f64 {
        self.engine.cache().peek_double(addr)
    }

    /// Writes every dirty cache line back to the backing store.
    pub fn flush_cache(&mut self) {
        self.engine.cache_mut().flush();
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &SimStats {
        self.engine.stats()
    }

    /// Cache statistics: (hits, misses, write-backs).
    pub fn cache_stats(&self) -> (u64, u64, u64) {
        let cache = self.engine.cache();
        (cache.hits(), cache.misses(), cache.writebacks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::reg::fp;
    use crate::isa::Opcode;

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CoreConfig::default();
        config.cache.block_size = 3;
        let result = Simulator::new(vec![], config);
        assert!(result.is_err());
    }

    #[test]
    fn test_initial_state_applies() {
        let mut sim = Simulator::new(vec![], CoreConfig::default()).unwrap();
        let init = InitialState::new()
            .with_register(2, 100.0)
            .with_register(fp(1), 10.0)
            .with_memory(100, 1.0);
        sim.apply_initial_state(&init);

        assert_eq!(sim.read_int(2), 100);
        assert_eq!(sim.read_fp(1), 10.0);
        assert_eq!(sim.memory_double(100), 1.0);
    }

    #[test]
    fn test_run_respects_cap() {
        // A single long divide cannot finish in two cycles.
        let program = vec![Instruction::arith(Opcode::DivD, fp(1), fp(2), fp(3))];
        let mut sim = Simulator::new(program, CoreConfig::default()).unwrap();
        let outcome = sim.run(2);
        assert!(!outcome.finished);
        assert_eq!(outcome.cycles, 2);
    }

    #[test]
    fn test_run_finishes_simple_program() {
        let program = vec![Instruction::arith_imm(Opcode::Daddi, 1, 0, 5)];
        let mut sim = Simulator::new(program, CoreConfig::default()).unwrap();
        let outcome = sim.run(100);
        assert!(outcome.finished);
        assert_eq!(sim.read_int(1), 5);
    }
}
