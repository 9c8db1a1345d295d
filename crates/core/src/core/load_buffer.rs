//! Load buffers.
//!
//! A load buffer holds one in-flight load from issue until its value wins
//! the Common Data Bus. The effective address arrives from an address unit;
//! memory ordering against earlier stores is re-checked every cycle until
//! the load may start. Access latency is fixed at issue time from a cache
//! probe of the base register's current value.

use crate::common::reg::RegisterFile;
use crate::common::tag::Tag;
use crate::core::cdb::CdbMessage;
use crate::isa::{Instruction, Opcode};
use crate::mem::traits::Memory;

/// Lifecycle state of a load buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Unoccupied.
    #[default]
    Free,
    /// Issued this cycle; advances next cycle.
    Issued,
    /// Effective address not yet computed, or memory ordering blocks the access.
    WaitingForAddress,
    /// Accessing memory; latency counting down.
    Executing,
    /// Value read; waiting to win the CDB.
    ResultReady,
}

/// A load buffer slot.
pub struct LoadBuffer {
    tag: Tag,
    state: LoadState,
    opcode: Option<Opcode>,
    dest_reg: Option<usize>,
    offset: i64,
    effective_address: i64,
    address_ready: bool,
    remaining_cycles: u64,
    sequence_number: u64,
    value: f64,
}

impl LoadBuffer {
    /// Creates a free load buffer with a fixed tag.
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            state: LoadState::Free,
            opcode: None,
            dest_reg: None,
            offset: 0,
            effective_address: 0,
            address_ready: false,
            remaining_cycles: 0,
            sequence_number: 0,
            value: 0.0,
        }
    }

    /// This buffer's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// True when the slot is unoccupied.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == LoadState::Free
    }

    /// True when the slot holds an in-flight load.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state != LoadState::Free
    }

    /// True when the value is read and awaiting the CDB.
    #[inline]
    pub fn is_result_ready(&self) -> bool {
        self.state == LoadState::ResultReady
    }

    /// The held opcode, if occupied.
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        self.opcode
    }

    /// Destination register index, if occupied.
    #[inline]
    pub fn dest_reg(&self) -> Option<usize> {
        self.dest_reg
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

    /// Remaining memory-access cycles.
    #[inline]
    pub fn remaining_cycles(&self) -> u64 {
        self.remaining_cycles
    }

    /// Issues a load into this buffer.
    ///
    /// `access_latency` was probed from the cache at issue time using the
    /// base register's current value. The destination register's producer
    /// becomes this buffer's tag (`R0` excepted).
    pub fn issue(
        &mut self,
        instr: &Instruction,
        regs: &mut RegisterFile,
        sequence_number: u64,
        access_latency: u64,
    ) {
        self.opcode = Some(instr.opcode);
        self.dest_reg = instr.dest;
        self.offset = instr.offset;
        self.effective_address = 0;
        self.address_ready = false;
        self.remaining_cycles = access_latency;
        self.sequence_number = sequence_number;
        self.value = 0.0;
        self.state = LoadState::Issued;

        if let Some(dest) = instr.dest {
            regs.set_producer(dest, self.tag);
        }
    }

    /// Records the effective address computed by an address unit.
    ///
    /// Promotion to `Executing` happens in the next cycle's advance, once
    /// memory ordering permits.
    pub fn set_effective_address(&mut self, ea: i64) {
        self.effective_address = ea;
        self.address_ready = true;
    }

    /// Advances the one-cycle transitions.
    ///
    /// `can_start` is the memory-ordering verdict: no earlier busy store
    /// with a matching (or unknown) effective address.
    pub fn advance(&mut self, can_start: bool) {
        match self.state {
            LoadState::Issued | LoadState::WaitingForAddress => {
                if self.address_ready && can_start {
                    self.state = LoadState::Executing;
                } else {
                    self.state = LoadState::WaitingForAddress;
                }
            }
            _ => {}
        }
    }

    /// Counts down the memory access; on completion reads the value once
    /// and produces the CDB message.
    pub fn tick_execute(&mut self, mem: &mut dyn Memory) -> Option<CdbMessage> {
        if self.state != LoadState::Executing {
            return None;
        }
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        if self.remaining_cycles > 0 {
            return None;
        }

        let addr = self.effective_address as u64;
        self.value = match self.opcode {
            Some(Opcode::Lw) => mem.load_word(addr) as f64,
            _ => mem.load_double(addr),
        };
        self.state = LoadState::ResultReady;
        Some(CdbMessage {
            tag: self.tag,
            value: self.value,
            dest_reg: self.dest_reg,
        })
    }

    /// Frees this buffer after its broadcast.
    pub fn free(&mut self) {
        self.state = LoadState::Free;
        self.opcode = None;
        self.dest_reg = None;
        self.offset = 0;
        self.effective_address = 0;
        self.address_ready = false;
        self.remaining_cycles = 0;
        self.value = 0.0;
    }
}
