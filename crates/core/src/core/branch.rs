//! Branch handlers.
//!
//! Only BEQ and BNE are modelled, non-speculatively: issue stalls entirely
//! while a branch is in flight, so a taken branch needs no shadow state:
//! nothing past it has issued. A handler captures its operands like a
//! reservation station, then spends `branch_latency` cycles in `Ready`
//! before the evaluate phase resolves it.

use crate::common::reg::RegisterFile;
use crate::common::tag::Tag;
use crate::isa::{Instruction, Opcode};

/// Lifecycle state of a branch handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BranchState {
    /// Unoccupied.
    #[default]
    Free,
    /// Issued this cycle; advances next cycle.
    Issued,
    /// At least one operand tag outstanding.
    WaitingForOperands,
    /// Operands captured; evaluation latency counting down.
    Ready,
}

/// The outcome of an evaluated branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchOutcome {
    /// The evaluated opcode.
    pub opcode: Opcode,
    /// Whether the branch condition held.
    pub taken: bool,
    /// Program index of the next instruction.
    pub next_pc: usize,
}

/// A branch handler slot.
pub struct BranchHandler {
    tag: Tag,
    state: BranchState,
    opcode: Option<Opcode>,
    vj: f64,
    vk: f64,
    qj: Option<Tag>,
    qk: Option<Tag>,
    current_pc: usize,
    target_pc: usize,
    remaining_cycles: u64,
    branch_latency: u64,
}

impl BranchHandler {
    /// Creates a free handler with a fixed tag and evaluation latency.
    pub fn new(tag: Tag, branch_latency: u64) -> Self {
        Self {
            tag,
            state: BranchState::Free,
            opcode: None,
            vj: 0.0,
            vk: 0.0,
            qj: None,
            qk: None,
            current_pc: 0,
            target_pc: 0,
            remaining_cycles: 0,
            branch_latency,
        }
    }

    /// This handler's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> BranchState {
        self.state
    }

    /// True when the slot is unoccupied.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == BranchState::Free
    }

    /// True when the slot holds an in-flight branch.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.state != BranchState::Free
    }

    /// The held opcode, if occupied.
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        self.opcode
    }

    /// First operand value.
    #[inline]
    pub fn vj(&self) -> f64 {
        self.vj
    }

    /// Second operand value.
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

    /// Program index of this branch.
    #[inline]
    pub fn current_pc(&self) -> usize {
        self.current_pc
    }

    /// Program index jumped to when taken.
    #[inline]
    pub fn target_pc(&self) -> usize {
        self.target_pc
    }

    /// Issues a branch into this handler.
    ///
    /// The target program index comes from the instruction's immediate
    /// field. Operand capture follows the reservation-station protocol.
    pub fn issue(&mut self, instr: &Instruction, regs: &RegisterFile, pc: usize) {
        self.opcode = Some(instr.opcode);
        self.current_pc = pc;
        self.target_pc = instr.immediate.max(0) as usize;
        self.remaining_cycles = 0;

        match instr.src1 {
            Some(s1) => match regs.producer(s1) {
                None => {
                    self.vj = regs.read(s1);
                    self.qj = None;
                }
                producer => self.qj = producer,
            },
            None => {
                self.vj = 0.0;
                self.qj = None;
            }
        }
        match instr.src2 {
            Some(s2) => match regs.producer(s2) {
                None => {
                    self.vk = regs.read(s2);
                    self.qk = None;
                }
                producer => self.qk = producer,
            },
            None => {
                self.vk = 0.0;
                self.qk = None;
            }
        }

        self.state = BranchState::Issued;
    }

    /// Advances the one-cycle `Issued` transition.
    pub fn advance(&mut self) {
        if self.state == BranchState::Issued {
            self.state = BranchState::WaitingForOperands;
            self.promote_if_ready();
        }
    }

    /// Captures a broadcast value if either operand is waiting on `tag`.
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
        if self.state == BranchState::WaitingForOperands
            && self.qj.is_none()
            && self.qk.is_none()
        {
            self.state = BranchState::Ready;
            self.remaining_cycles = self.branch_latency;
        }
    }

    /// Counts down the evaluation latency; on expiry resolves the branch
    /// and frees the handler.
    ///
    /// The condition compares the integer conversions of the operands:
    /// `taken = (Vj == Vk)` for BEQ, `taken = (Vj != Vk)` for BNE. The next
    /// PC is the target when taken, the fall-through index otherwise.
    pub fn evaluate_tick(&mut self) -> Option<BranchOutcome> {
        if self.state != BranchState::Ready {
            return None;
        }
        self.remaining_cycles = self.remaining_cycles.saturating_sub(1);
        if self.remaining_cycles > 0 {
            return None;
        }

        let a = self.vj as i64;
        let b = self.vk as i64;
        let opcode = self.opcode.unwrap_or(Opcode::Beq);
        let taken = match opcode {
            Opcode::Beq => a == b,
            Opcode::Bne => a != b,
            _ => false,
        };
        let next_pc = if taken {
            self.target_pc
        } else {
            self.current_pc + 1
        };

        self.free();
        Some(BranchOutcome {
            opcode,
            taken,
            next_pc,
        })
    }

    /// Frees this handler.
    pub fn free(&mut self) {
        self.state = BranchState::Free;
        self.opcode = None;
        self.qj = None;
        self.qk = None;
        self.remaining_cycles = 0;
    }
}
