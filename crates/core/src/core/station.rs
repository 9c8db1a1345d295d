//! Reservation stations.
//!
//! A station holds one issued instruction from issue until its result wins
//! the Common Data Bus. Operands are captured from the register file at
//! issue when available, otherwise renamed to the producer's tag and filled
//! in by a later broadcast. The `Issued` pseudo-state delays operand-capture
//! eligibility by one cycle so a broadcast in the issue cycle cannot
//! shortcut the pipeline.

use crate::common::reg::RegisterFile;
use crate::common::tag::Tag;
use crate::isa::{Instruction, Opcode};

/// Lifecycle state of a reservation station.
///
/// Invariant: the station is busy iff the state is not `Free`; in
/// `WaitingForFu` both operand tags are clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RsState {
    /// Unoccupied.
    #[default]
    Free,
    /// Issued this cycle; advances next cycle.
    Issued,
    /// At least one operand tag outstanding.
    WaitingForOperands,
    /// Operands ready; waiting for a free functional unit.
    WaitingForFu,
    /// Dispatched to a functional unit.
    Executing,
    /// Result computed; waiting to win the CDB.
    Executed,
}

/// The ALU family a station feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsType {
    /// ADD.D / SUB.D (and single-precision forms).
    FpAddSub,
    /// MUL.D / DIV.D (and single-precision forms).
    FpMulDiv,
    /// Integer arithmetic, logical, shift, compare.
    IntAlu,
}

/// A reservation station slot.
pub struct ReservationStation {
    tag: Tag,
    rs_type: RsType,
    state: RsState,
    instruction: Option<Instruction>,
    vj: f64,
    vk: f64,
    qj: Option<Tag>,
    qk: Option<Tag>,
    dest_reg: Option<usize>,
}

impl ReservationStation {
    /// Creates a free station with a fixed tag.
    pub fn new(tag: Tag, rs_type: RsType) -> Self {
        Self {
            tag,
            rs_type,
            state: RsState::Free,
            instruction: None,
            vj: 0.0,
            vk: 0.0,
            qj: None,
            qk: None,
            dest_reg: None,
        }
    }

    /// This station's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The ALU family this station feeds.
    #[inline]
    pub fn rs_type(&self) -> RsType {
        self.rs_type
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> RsState {
        self.state
    }

    /// True when the slot is unoccupied.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == RsState::Free
    }

    /// True when the slot holds an issued instruction.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state != RsState::Free
    }

    /// True when operands are ready and no FU has been claimed yet.
    #[inline]
    pub fn is_waiting_for_fu(&self) -> bool {
        self.state == RsState::WaitingForFu
    }

    /// True when the result is computed and awaiting the CDB.
    #[inline]
    pub fn is_result_ready(&self) -> bool {
        self.state == RsState::Executed
    }

    /// The held instruction's opcode, if occupied.
    pub fn opcode(&self) -> Option<Opcode> {
        self.instruction.map(|i| i.opcode)
    }

    /// The held instruction's immediate field (0 when free).
    pub fn immediate(&self) -> i64 {
        self.instruction.map_or(0, |i| i.immediate)
    }

    /// First operand value (valid when `qj` is clear).
    #[inline]
    pub fn vj(&self) -> f64 {
        self.vj
    }

    /// Second operand value (valid when `qk` is clear).
    #[inline]
    pub fn vk(&self) -> f64 {
        self.vk
    }

    /// Outstanding producer of the first operand.
    #[inline]
    pub fn qj(&self) -> Option<Tag> {
        self.qj
    }

    /// Outstanding producer of the second operand.
    #[inline]
    pub fn qk(&self) -> Option<Tag> {
        self.qk
    }

    /// Destination register index, if the instruction writes one.
    #[inline]
    pub fn dest_reg(&self) -> Option<usize> {
        self.dest_reg
    }

    /// Issues an instruction into this station.
    ///
    /// Source operands are read from the register file when no producer is
    /// pending, otherwise the producer tag is recorded. The destination
    /// register's producer becomes this station's tag (`R0` excepted),
    /// overwriting any previous producer: WAW is handled by renaming, and
    /// the overwritten producer's broadcast is later suppressed by the
    /// stale-tag check.
    pub fn issue(&mut self, instr: &Instruction, regs: &mut RegisterFile) {
        self.instruction = Some(*instr);
        self.dest_reg = instr.dest;

        match instr.src1 {
            Some(s1) => match regs.producer(s1) {
                None => {
                    self.vj = regs.read(s1);
                    self.qj = None;
                }
                producer => self.qj = producer,
            },
            None => self.qj = None,
        }

        if instr.uses_second_source() {
            // uses_second_source implies src2 is present
            let s2 = instr.src2.unwrap_or(0);
            match regs.producer(s2) {
                None => {
                    self.vk = regs.read(s2);
                    self.qk = None;
                }
                producer => self.qk = producer,
            }
        } else {
            self.qk = None;
        }

        if let Some(dest) = instr.dest {
            regs.set_producer(dest, self.tag);
        }

        self.state = RsState::Issued;
    }

    /// Advances the one-cycle `Issued` transition.
    ///
    /// An already-operand-ready station moves straight to `WaitingForFu`,
    /// otherwise to `WaitingForOperands`.
    pub fn advance(&mut self) {
        if self.state == RsState::Issued {
            self.state = RsState::WaitingForOperands;
            self.promote_if_ready();
        }
    }

    /// Captures a broadcast value if either operand is waiting on `tag`.
    ///
    /// Wake-up is monotonic: a cleared tag is never reasserted for the same
    /// issuance. The `WaitingForOperands -> WaitingForFu` transition happens
    /// in the same cycle as the satisfying broadcast.
    pub fn on_cdb_broadcast(&mut self, tag: Tag, value: f64) {
        if self.is_free() {
            return;
        }
        if self.qj == Some(tag) {
            self.qj = None;
            self.vj = value;
        }
        if self.qk == Some(tag) {
            self.qk = None;
            self.vk = value;
        }
        self.promote_if_ready();
    }

    fn promote_if_ready(&mut self) {
        if self.state == RsState::WaitingForOperands && self.qj.is_none() && self.qk.is_none() {
            self.state = RsState::WaitingForFu;
        }
    }

    /// Called once when a functional unit starts executing this station.
    pub fn on_start_execution(&mut self) {
        if self.state == RsState::WaitingForFu {
            self.state = RsState::Executing;
        }
    }

    /// Called by the functional unit when its latency expires.
    pub fn on_execution_finished(&mut self) {
        if self.state == RsState::Executing {
            self.state = RsState::Executed;
        }
    }

    /// Frees this station after its broadcast.
    pub fn free(&mut self) {
        self.state = RsState::Free;
        self.instruction = None;
        self.dest_reg = None;
        self.qj = None;
        self.qk = None;
        // vj/vk may keep stale values; they are only read while busy.
    }
}
