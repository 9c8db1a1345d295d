//! Per-cycle structural invariants, checked on every snapshot of a run.

use std::collections::HashSet;

use crate::common::harness::TestContext;
use crate::common::program;
use tomasim_core::common::tag::Tag;
use tomasim_core::config::CoreConfig;
use tomasim_core::core::load_buffer::LoadState;
use tomasim_core::core::station::RsState;
use tomasim_core::core::store_buffer::StoreState;
use tomasim_core::snapshot::CycleSnapshot;

/// Tags of all busy result producers (stations and load buffers).
fn busy_producer_tags(snap: &CycleSnapshot) -> Vec<Tag> {
    let mut tags = Vec::new();
    for rs in &snap.stations {
        if rs.state != RsState::Free {
            tags.push(rs.tag);
        }
    }
    for lb in &snap.load_buffers {
        if lb.state != LoadState::Free {
            tags.push(lb.tag);
        }
    }
    tags
}

fn check_invariants(snap: &CycleSnapshot, cache_size: usize, block_size: usize) {
    let producers = busy_producer_tags(snap);
    let count_of = |tag: Tag| producers.iter().filter(|&&t| t == tag).count();

    // 1. Every renamed register names exactly one busy producer.
    for reg in &snap.registers {
        if let Some(tag) = reg.producer {
            assert_eq!(
                count_of(tag),
                1,
                "cycle {}: register {} names producer {} which is not uniquely busy",
                snap.cycle,
                reg.index,
                tag
            );
        }
    }

    // 2. Every outstanding operand tag names exactly one busy producer.
    let mut operand_tags = Vec::new();
    for rs in &snap.stations {
        if rs.state != RsState::Free {
            operand_tags.extend(rs.qj);
            operand_tags.extend(rs.qk);
        }
    }
    for bh in &snap.branch_handlers {
        operand_tags.extend(bh.qj);
        operand_tags.extend(bh.qk);
    }
    for sb in &snap.store_buffers {
        if sb.state != StoreState::Free {
            operand_tags.extend(sb.source_tag);
        }
    }
    for tag in operand_tags {
        assert_eq!(
            count_of(tag),
            1,
            "cycle {}: operand tag {} has no unique busy producer",
            snap.cycle,
            tag
        );
    }

    // 3. A station waiting for an FU has both operands resolved.
    for rs in &snap.stations {
        if rs.state == RsState::WaitingForFu {
            assert!(rs.qj.is_none() && rs.qk.is_none());
        }
    }

    // 4. No functional unit pool executes the same station twice; the CDB
    //    broadcast is at most one by construction of the snapshot field.
    let mut seen = HashSet::new();
    for fu in &snap.functional_units {
        if fu.busy {
            let station = fu.station.expect("busy unit references a station");
            assert!(
                seen.insert((fu.fu_type as usize, station)),
                "cycle {}: two units of one pool execute station {}",
                snap.cycle,
                station
            );
        }
    }

    // 5. Busy memory ops carry unique sequence numbers.
    let mut seqs = HashSet::new();
    for lb in &snap.load_buffers {
        if lb.state != LoadState::Free {
            assert!(seqs.insert(lb.sequence_number));
        }
    }
    for sb in &snap.store_buffers {
        if sb.state != StoreState::Free {
            assert!(seqs.insert(sb.sequence_number));
        }
    }

    // 6. A dirty line is valid, and the lines cover the whole cache.
    for line in &snap.cache_lines {
        if line.dirty {
            assert!(line.valid, "cycle {}: dirty invalid line", snap.cycle);
        }
    }
    assert_eq!(snap.cache_lines.len() * block_size, cache_size);
}

fn run_checking(mut ctx: TestContext, cache_size: usize, block_size: usize) {
    while !ctx.sim.is_finished() {
        let snap = ctx.step().clone();
        check_invariants(&snap, cache_size, block_size);
        assert!(ctx.snapshots.len() < 10_000);
    }
}

#[test]
fn test_invariants_hold_through_raw_chain() {
    let config = CoreConfig::default();
    let (cache, block) = (config.cache.cache_size, config.cache.block_size);
    run_checking(TestContext::standard(program::raw_chain()), cache, block);
}

#[test]
fn test_invariants_hold_through_branch_and_collision() {
    use tomasim_core::common::reg::fp;
    use tomasim_core::isa::{Instruction, Opcode};

    // Not-taken branch followed by a store/load address collision.
    let program = vec![
        Instruction::arith_imm(Opcode::Daddi, 1, 0, 1),
        Instruction::branch(Opcode::Beq, 1, 0, 0),
        Instruction::arith(Opcode::DivD, fp(1), fp(3), fp(4)),
        Instruction::store(Opcode::SdD, fp(1), 2, 0),
        Instruction::load(Opcode::LdD, fp(2), 2, 0),
    ];
    let config = CoreConfig::default();
    let (cache, block) = (config.cache.cache_size, config.cache.block_size);
    run_checking(TestContext::standard(program), cache, block);
}

#[test]
fn test_invariants_hold_under_tiny_pools() {
    let mut config = CoreConfig::default();
    config.pools.num_fp_add_sub_rs = 1;
    config.pools.num_fp_mul_div_rs = 1;
    config.pools.num_int_rs = 1;
    config.pools.num_load_buffers = 1;
    config.pools.num_store_buffers = 1;
    config.pools.num_address_units = 1;
    let (cache, block) = (config.cache.cache_size, config.cache.block_size);

    let ctx = TestContext::with_setup(
        program::raw_chain(),
        config,
        crate::common::harness::standard_initial_state(),
    );
    run_checking(ctx, cache, block);
}
