//! Store buffers.
//!
//! A store carries two dependencies: an address dependency through its base
//! register and a value dependency through its source register. The value is
//! read at issue when the source register has no pending producer, otherwise
//! captured from a later CDB broadcast; a capture can never promote the
//! store to `Executing` in the same cycle, because promotion only happens in
//! the advance phase that precedes broadcast. Access latency is probed when
//! the store is ready to commit, so the hit/miss outcome reflects earlier
//! cache state changes. Commit writes through the cache and frees the buffer
//! without a CDB message.

use crate::common::reg::RegisterFile;
use crate::common::tag::Tag;
use crate::isa::{Instruction, Opcode};
use crate::mem::traits::Memory;

/// Lifecycle state of a store buffer.
///
/// Invariant: `value_ready` iff no source tag is outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreState {
    /// Unoccupied.
    #[default]
    Free,
    /// Issued this cycle; advances next cycle.
    Issued,
    /// Effective address not yet computed, or memory ordering blocks the access.
    WaitingForAddress,
    /// Address ready; waiting for the value via CDB.
    WaitingForValue,
    /// Committing to the cache; latency counting down.
    Executing,
}

/// A store buffer slot.
pub struct StoreBuffer {
    tag: Tag,
    state: StoreState,
    opcode: Option<Opcode>,
    offset: i64,
    effective_address: i64,
    address_ready: bool,
    value_to_store: f64,
    source_tag: Option<Tag>,
    value_ready: bool,
    remaining_cycles: u64,
    sequence_number: u64,
}

impl StoreBuffer {
    /// Creates a free store buffer with a fixed tag.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            state: StoreState::Free,
            opcode: None,
            offset: 0,
            effective_address: 0,
            address_ready: false,
            value_to_store: 0.0,
            source_tag: None,
            value_ready: false,
            remaining_cycles: 0,
            sequence_number: 0,
        }
    }

    /// This buffer's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// True when the slot is unoccupied.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == StoreState::Free
    }

    /// True when the slot holds an in-flight store.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state != StoreState::Free
    }

    /// The held opcode, if occupied.
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        self.opcode
    }

    /// Program-order sequence number among memory operations.
    #[inline]
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Computed effective address (valid once `address_ready`).
    #[inline]
    pub fn effective_address(&self) -> i64 {
        self.effective_address
    }

    /// True once the address unit has delivered the effective address.
    #[inline]
    pub fn address_ready(&self) -> bool {
        self.address_ready
    }

    /// True once the value to store has been captured.
    #[inline]
    pub fn value_ready(&self) -> bool {
        self.value_ready
    }

    /// The value to store (valid once `value_ready`).
    #[inline]
    pub fn value_to_store(&self) -> f64 {
        self.value_to_store
    }

    /// Outstanding producer of the value, or `None`.
    #[inline]
    pub fn source_tag(&self) -> Option<Tag> {
        self.source_tag
    }

    /// Remaining commit cycles.
    #[inline]
    pub fn remaining_cycles(&self) -> u64 {
        self.remaining_cycles
    }

    /// Issues a store into this buffer.
    ///
    /// The value is read from the source register immediately when no
    /// producer is pending; otherwise the producer's tag is recorded and the
    /// value arrives via CDB capture.
    pub fn issue(&mut self, instr: &Instruction, regs: &RegisterFile, sequence_number: u64) {
        self.opcode = Some(instr.opcode);
        self.offset = instr.offset;
        self.effective_address = 0;
        self.address_ready = false;
        self.remaining_cycles = 0;
        self.sequence_number = sequence_number;
        self.state = StoreState::Issued;

        match instr.src1 {
            Some(src) => match regs.producer(src) {
                None => {
                    self.source_tag = None;
                    self.value_ready = true;
                    self.value_to_store = regs.read(src);
                }
                producer => {
                    self.source_tag = producer;
                    self.value_ready = false;
                    self.value_to_store = 0.0;
                }
            },
            None => {
                self.source_tag = None;
                self.value_ready = true;
                self.value_to_store = 0.0;
            }
        }
    }

    /// Records the effective address computed by an address unit.
    pub fn set_effective_address(&mut self, ea: i64) {
        self.effective_address = ea;
        self.address_ready = true;
    }

    /// True when both address and value are ready and the store could be
    /// promoted to `Executing` (memory ordering permitting).
    pub fn ready_to_execute(&self) -> bool {
        matches!(
            self.state,
            StoreState::Issued | StoreState::WaitingForAddress | StoreState::WaitingForValue
        ) && self.address_ready
            && self.value_ready
    }

    /// Starts the commit with the latency probed from the cache.
    pub fn start_execution(&mut self, access_latency: u64) {
        self.remaining_cycles = access_latency;
        self.state = StoreState::Executing;
    }

    /// Advances the waiting-state transitions when the store cannot start.
    pub fn advance_waiting(&mut self) {
        if !matches!(
            self.state,
            StoreState::Issued | StoreState::WaitingForAddress | StoreState::WaitingForValue
        ) {
            return;
        }
        if self.address_ready && !self.value_ready {
            self.state = StoreState::WaitingForValue;
        } else {
            self.state = StoreState::WaitingForAddress;
        }
    }

    /// Captures a broadcast value if this store is waiting on `tag`.
    ///
    /// The promotion to `Executing` is observed no earlier than the next
    /// cycle's advance phase, modelling the capture latency.
    pub fn on_cdb_broadcast(&mut self, tag: Tag, value: f64) {
        if self.is_busy() && self.source_tag == Some(tag) {
            self.value_to_store = value;
            self.value_ready = true;
            self.source_tag = None;
        }
    }

    /// Counts down the commit; on completion writes through the cache and
    /// frees the buffer. Returns the committed (address, value) pair.
    pub fn tick_execute(&mut self, mem: &mut dyn Memory) -> Option<(i64, f64)> {
        if self.state != StoreState::Executing {
            return None;
        }
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        if self.remaining_cycles > 0 {
            return None;
        }

        let addr = self.effective_address as u64;
        let value = self.value_to_store;
        match self.opcode {
            Some(Opcode::Sw) => mem.store_word(addr, value as i32),
            _ => mem.store_double(addr, value),
        }
        let committed = (self.effective_address, value);
        self.free();
        Some(committed)
    }

    /// Frees this buffer.
    pub fn free(&mut self) {
        self.state = StoreState::Free;
        self.opcode = None;
        self.offset = 0;
        self.effective_address = 0;
        self.address_ready = false;
        self.value_to_store = 0.0;
        self.source_tag = None;
        self.value_ready = false;
        self.remaining_cycles = 0;
    }
}
