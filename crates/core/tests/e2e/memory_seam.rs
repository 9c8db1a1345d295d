//! Buffer-to-memory seam tests against a mocked `Memory`.

use mockall::predicate::eq;

use crate::common::mocks::memory::MockMem;
use tomasim_core::common::reg::{RegisterFile, fp};
use tomasim_core::common::tag::{Tag, TagClass};
use tomasim_core::core::load_buffer::LoadBuffer;
use tomasim_core::core::store_buffer::StoreBuffer;
use tomasim_core::isa::{Instruction, Opcode};

#[test]
fn test_load_reads_exactly_once_at_effective_address() {
    let mut mem = MockMem::new();
    mem.expect_load_double()
        .with(eq(16u64))
        .times(1)
        .return_const(2.5f64);

    let mut regs = RegisterFile::new();
    let mut lb = LoadBuffer::new(Tag::new(TagClass::Load, 0));
    lb.issue(&Instruction::load(Opcode::LdD, fp(6), 2, 16), &mut regs, 0, 2);
    lb.set_effective_address(16);
    lb.advance(true);

    assert!(lb.tick_execute(&mut mem).is_none());
    let msg = lb.tick_execute(&mut mem).expect("access completes");
    assert_eq!(msg.value, 2.5);

    // Waiting on the CDB must not touch memory again.
    assert!(lb.tick_execute(&mut mem).is_none());
}

#[test]
fn test_word_load_uses_word_access() {
    let mut mem = MockMem::new();
    mem.expect_load_word()
        .with(eq(8u64))
        .times(1)
        .return_const(-3i32);

    let mut regs = RegisterFile::new();
    let mut lb = LoadBuffer::new(Tag::new(TagClass::Load, 0));
    lb.issue(&Instruction::load(Opcode::Lw, 5, 2, 8), &mut regs, 0, 1);
    lb.set_effective_address(8);
    lb.advance(true);

    let msg = lb.tick_execute(&mut mem).expect("access completes");
    assert_eq!(msg.value, -3.0);
}

#[test]
fn test_store_writes_exactly_once_on_commit() {
    let mut mem = MockMem::new();
    mem.expect_store_double()
        .with(eq(24u64), eq(7.5f64))
        .times(1)
        .return_const(());

    let mut regs = RegisterFile::new();
    regs.write(fp(1), 7.5);
    let mut sb = StoreBuffer::new(Tag::new(TagClass::Store, 0));
    sb.issue(&Instruction::store(Opcode::SdD, fp(1), 2, 24), &regs, 0);
    sb.set_effective_address(24);
    sb.start_execution(2);

    assert!(sb.tick_execute(&mut mem).is_none());
    assert!(sb.tick_execute(&mut mem).is_some());
    assert!(sb.is_free());
}
