//! Functional laws: memory coherence, completion bounds, latency
//! monotonicity, and determinism.

use crate::common::harness::{TestContext, standard_initial_state};
use crate::common::program;
use tomasim_core::config::CoreConfig;
use tomasim_core::isa::{Instruction, Opcode};
use tomasim_core::sim::InitialState;

#[test]
fn test_load_observes_most_recent_store_by_sequence() {
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 42),
        Instruction::store(Opcode::Sd, 1, 2, 0),
        Instruction::load(Opcode::Ld, 3, 2, 0),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();
    assert_eq!(ctx.int(3), 42);
}

#[test]
fn test_load_with_no_store_observes_initial_memory() {
    let program = vec![Instruction::load(Opcode::LdD, tomasim_core::common::reg::fp(5), 2, 20)];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();
    assert_eq!(ctx.fp(5), 3.0, "address 120 was pre-initialized");
}

#[test]
fn test_independent_arithmetic_completion_is_bounded() {
    // With pool sizes covering the whole program, n one-cycle ops drain in
    // n + latency cycles plus the constant issue/broadcast skew.
    for n in [1, 2, 3] {
        let mut ctx = TestContext::bare(program::independent_ints(n));
        let cycles = ctx.run_to_completion();
        assert!(
            cycles <= (n as u64) + 1 + 2,
            "{} independent ops took {} cycles",
            n,
            cycles
        );
        for i in 1..=n {
            assert_eq!(ctx.int(i), i as i64);
        }
    }
}

#[test]
fn test_doubling_latency_never_speeds_completion() {
    let base_cycles = {
        let mut ctx = TestContext::standard(program::raw_chain());
        ctx.run_to_completion()
    };

    let mut slow_fp = CoreConfig::default();
    slow_fp.latency.fp_add_sub *= 2;
    slow_fp.latency.fp_mul *= 2;
    slow_fp.latency.fp_div *= 2;
    let slow_fp_cycles = {
        let mut ctx =
            TestContext::with_setup(program::raw_chain(), slow_fp, standard_initial_state());
        ctx.run_to_completion()
    };
    assert!(slow_fp_cycles >= base_cycles);

    let mut slow_miss = CoreConfig::default();
    slow_miss.cache.miss_penalty *= 2;
    let slow_miss_cycles = {
        let mut ctx =
            TestContext::with_setup(program::raw_chain(), slow_miss, standard_initial_state());
        ctx.run_to_completion()
    };
    assert!(slow_miss_cycles >= base_cycles);
}

#[test]
fn test_snapshot_sequence_is_deterministic() {
    let run = || {
        let mut ctx = TestContext::standard(program::raw_chain());
        ctx.run_to_completion();
        let logs: Vec<String> = ctx
            .snapshots
            .iter()
            .flat_map(|s| s.log.iter().cloned())
            .collect();
        let regs: Vec<(usize, f64)> = ctx
            .sim
            .registers()
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.value))
            .collect();
        (ctx.snapshots.len(), logs, regs)
    };

    let first = run();
    let second = run();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn test_terminal_memory_consistent_after_flush() {
    let mut ctx = TestContext::standard(program::raw_chain());
    ctx.run_to_completion();

    let before = ctx.sim.memory_double(108);
    ctx.sim.flush_cache();
    let after = ctx.sim.memory_double(108);
    assert_eq!(before, after, "peek sees through the cache");
    assert_eq!(after, 3.0);
}

#[test]
fn test_config_from_json_runs_identically_to_default() {
    let config: CoreConfig = serde_json::from_str("{}").expect("all fields default");
    let mut from_json = TestContext::with_setup(
        program::independent_ints(3),
        config,
        InitialState::new(),
    );
    let mut from_default = TestContext::bare(program::independent_ints(3));
    assert_eq!(
        from_json.run_to_completion(),
        from_default.run_to_completion()
    );
}
