//! End-to-end behavioral scenarios.

use crate::common::harness::TestContext;
use crate::common::program;
use tomasim_core::common::reg::fp;
use tomasim_core::common::tag::{Tag, TagClass};
use tomasim_core::isa::{Instruction, Opcode};
use tomasim_core::sim::InitialState;

#[test]
fn test_classic_raw_chain() {
    let mut ctx = TestContext::standard(program::raw_chain());
    ctx.run_to_completion();

    assert_eq!(ctx.fp(6), 3.0, "F6 = (2.0 - 1.0) + 2.0");
    assert_eq!(ctx.fp(8), 1.0, "F8 = 2.0 - 1.0");
    assert_eq!(ctx.fp(0), 8.0, "F0 = 2.0 * 4.0");
    assert_eq!(ctx.fp(10), 8.0, "F10 = 8.0 / 1.0");
    assert_eq!(ctx.fp(2), 2.0, "F2 is the loaded value");
    assert_eq!(ctx.sim.memory_double(108), 3.0, "S.D committed F6");
}

#[test]
fn test_raw_chain_registers_quiesce() {
    let mut ctx = TestContext::standard(program::raw_chain());
    ctx.run_to_completion();
    assert!(
        !ctx.sim.registers().any_producer_pending(),
        "all producer fields are clear at termination"
    );
}

#[test]
fn test_waw_renaming_keeps_last_writer() {
    // Both writes target F1; only the second producer's broadcast may land.
    let program = vec![
        Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(3)),
        Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(4)),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    assert_eq!(ctx.fp(1), 6.0, "F1 = 2.0 + 4.0, not 5.0");
    assert!(
        ctx.log_lines()
            .iter()
            .any(|l| l.contains("stale write to F1")),
        "the first producer's broadcast was suppressed"
    );
}

#[test]
fn test_cdb_arbitration_prefers_most_dependents() {
    // Two integer ops are woken by the same load broadcast, execute in
    // parallel, and finish in the same cycle. The first feeds three
    // dependents (one station, two store value sources); the second feeds
    // none and must be deferred exactly one cycle.
    let program = vec![
        Instruction::load(Opcode::Ld, 5, 2, 0),
        Instruction::arith(Opcode::Dadd, 1, 5, 5),
        Instruction::arith(Opcode::Dadd, 9, 5, 5),
        Instruction::arith(Opcode::Dadd, 3, 1, 0),
        Instruction::store(Opcode::Sd, 1, 2, 8),
        Instruction::store(Opcode::Sd, 1, 2, 16),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    let contended = Tag::new(TagClass::IntAlu, 0);
    let deferred = Tag::new(TagClass::IntAlu, 1);
    let contended_cycle = ctx.broadcast_cycle(contended).expect("R1 producer broadcast");
    let deferred_cycle = ctx.broadcast_cycle(deferred).expect("R9 producer broadcast");
    assert_eq!(
        deferred_cycle,
        contended_cycle + 1,
        "the dependent-free producer lost arbitration by exactly one cycle"
    );
    assert!(
        ctx.log_lines().iter().any(|l| l.contains("deferred")),
        "the contention was logged"
    );

    // mem[100] holds 1.0, so R5 = 1 and R1 = R9 = R3 = 2.
    assert_eq!(ctx.int(1), 2);
    assert_eq!(ctx.int(9), 2);
    assert_eq!(ctx.int(3), 2);
    assert_eq!(ctx.sim.memory_double(108), 2.0);
    assert_eq!(ctx.sim.memory_double(116), 2.0);
}

#[test]
fn test_load_waits_for_colliding_store() {
    // The store's value is produced by a 40-cycle divide; the load to the
    // same address must not read memory until the store commits.
    let program = vec![
        Instruction::arith(Opcode::DivD, fp(1), fp(3), fp(4)),
        Instruction::store(Opcode::SdD, fp(1), 2, 0),
        Instruction::load(Opcode::LdD, fp(2), 2, 0),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    // mem[100] started at 1.0; reading 0.75 proves the load observed the
    // store rather than racing past it.
    assert_eq!(ctx.fp(2), 0.75, "F2 = F3 / F4 via the store");
    assert_eq!(ctx.sim.memory_double(100), 0.75);
}

#[test]
fn test_taken_branch_flushes_wrong_path() {
    // target = 3: the first ADD.D is flushed and never retires.
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 1),
        Instruction::branch(Opcode::Beq, 1, 1, 3),
        Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(3)),
        Instruction::arith(Opcode::AddD, fp(4), fp(2), fp(3)),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    assert_eq!(ctx.fp(1), 10.0, "the flushed ADD.D never wrote F1");
    assert_eq!(ctx.fp(4), 5.0, "the target ADD.D retired");
    assert_eq!(ctx.sim.stats().branches_taken, 1);
    assert_eq!(ctx.sim.stats().branches_evaluated, 1);
}

#[test]
fn test_not_taken_branch_falls_through() {
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 1),
        Instruction::branch(Opcode::Bne, 1, 1, 3),
        Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(3)),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    assert_eq!(ctx.fp(1), 5.0, "the fall-through ADD.D retired");
    assert_eq!(ctx.sim.stats().branches_taken, 0);
}

#[test]
fn test_issue_stalls_while_branch_pending() {
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 1),
        Instruction::branch(Opcode::Beq, 1, 1, 2),
        Instruction::arith(Opcode::AddD, fp(4), fp(2), fp(3)),
    ];
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();

    assert!(ctx.sim.stats().stalls_branch > 0);
    assert_eq!(ctx.fp(4), 5.0);
}

#[test]
fn test_cache_miss_then_hit_latency() {
    // The first load (cold cache at 200) misses. The second load's base
    // register depends on the first's value, so it issues only after the
    // block has been fetched and probes a hit.
    let program = vec![
        Instruction::load(Opcode::Ld, 4, 2, 0),
        Instruction::arith(Opcode::Dadd, 5, 4, 2),
        Instruction::load(Opcode::LdD, fp(2), 5, 0),
    ];
    let init = InitialState::new().with_register(2, 200.0);
    let mut ctx = TestContext::with_setup(program, Default::default(), init);
    ctx.run_to_completion();

    let lines = ctx.log_lines();
    assert!(
        lines.iter().any(|l| l.contains("latency=11, MISS")),
        "first access pays hit latency plus miss penalty"
    );
    assert!(
        lines.iter().any(|l| l.contains("latency=1, HIT")),
        "second access to the same block pays only hit latency"
    );
    let (hits, misses, _) = ctx.sim.cache_stats();
    assert_eq!(misses, 1);
    assert_eq!(hits, 1);
}

#[test]
fn test_integer_divide_by_zero_warns_and_continues() {
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 42),
        Instruction::arith(Opcode::Ddiv, 3, 1, 7),
    ];
    let mut ctx = TestContext::bare(program);
    ctx.run_to_completion();

    assert_eq!(ctx.int(3), 0, "divide by zero yields 0");
    assert_eq!(ctx.sim.stats().int_divide_by_zero, 1);
    assert!(
        ctx.log_lines().iter().any(|l| l.contains("divide by zero")),
        "the anomaly is logged, not raised"
    );
}

#[test]
fn test_fp_divide_by_zero_is_ieee() {
    let program = vec![Instruction::arith(Opcode::DivD, fp(5), fp(2), fp(6))];
    // F6 stays 0.0: 2.0 / 0.0 = +inf.
    let mut ctx = TestContext::standard(program);
    ctx.run_to_completion();
    assert_eq!(ctx.fp(5), f64::INFINITY);
}

#[test]
fn test_out_of_bounds_load_reads_zero_with_warning() {
    let program = vec![Instruction::load(Opcode::LdD, fp(2), 2, 0)];
    let init = InitialState::new().with_register(2, 1_000_000.0);
    let mut ctx = TestContext::with_setup(program, Default::default(), init);
    ctx.run_to_completion();

    assert_eq!(ctx.fp(2), 0.0);
    assert!(ctx.log_lines().iter().any(|l| l.contains("[WARN]")));
}
