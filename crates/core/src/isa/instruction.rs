//! Instruction records and opcode classification.

use std::fmt;

use crate::common::reg::reg_name;

/// The closed opcode set.
///
/// Single-precision FP forms (`_S`) execute on the same IEEE-754 double
/// path as the `_D` forms; register values are stored as doubles throughout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Load 64-bit integer doubleword.
    Ld,
    /// Load 32-bit integer word.
    Lw,
    /// Load single-precision FP.
    LdS,
    /// Load double-precision FP.
    LdD,
    /// Store 64-bit integer doubleword.
    Sd,
    /// Store 32-bit integer word.
    Sw,
    /// Store single-precision FP.
    SdS,
    /// Store double-precision FP.
    SdD,
    /// Integer add (register).
    Dadd,
    /// Integer add immediate.
    Daddi,
    /// Integer subtract (register).
    Dsub,
    /// Integer subtract immediate.
    Dsubi,
    /// Integer multiply.
    Dmul,
    /// Integer divide (divide-by-zero yields 0 with a warning).
    Ddiv,
    /// Bitwise OR (register).
    Or,
    /// Bitwise OR immediate.
    Ori,
    /// Bitwise XOR (register).
    Xor,
    /// Bitwise XOR immediate.
    Xori,
    /// Set-less-than (register).
    Slt,
    /// Set-less-than immediate.
    Slti,
    /// Shift left logical by immediate.
    Dsll,
    /// Shift right logical by immediate.
    Dsrl,
    /// Shift right arithmetic by immediate.
    Dsra,
    /// FP add, double precision.
    AddD,
    /// FP subtract, double precision.
    SubD,
    /// FP add, single precision.
    AddS,
    /// FP subtract, single precision.
    SubS,
    /// FP multiply, double precision.
    MulD,
    /// FP divide, double precision.
    DivD,
    /// FP multiply, single precision.
    MulS,
    /// FP divide, single precision.
    DivS,
    /// Branch if equal.
    Beq,
    /// Branch if not equal.
    Bne,
}

/// Structural class of an instruction, deciding which pool it issues to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrClass {
    /// Load buffer.
    Load,
    /// Store buffer.
    Store,
    /// Integer ALU reservation station.
    IntAlu,
    /// FP add/sub reservation station.
    FpAddSub,
    /// FP mul/div reservation station.
    FpMulDiv,
    /// Branch handler.
    Branch,
}

impl Opcode {
    /// Classifies this opcode. Total: every opcode belongs to exactly one class.
    pub fn class(self) -> InstrClass {
        use Opcode::*;
        match self {
            Ld | Lw | LdS | LdD => InstrClass::Load,
            Sd | Sw | SdS | SdD => InstrClass::Store,
            Dadd | Daddi | Dsub | Dsubi | Dmul | Ddiv | Or | Ori | Xor | Xori | Slt | Slti
            | Dsll | Dsrl | Dsra => InstrClass::IntAlu,
            AddD | SubD | AddS | SubS => InstrClass::FpAddSub,
            MulD | DivD | MulS | DivS => InstrClass::FpMulDiv,
            Beq | Bne => InstrClass::Branch,
        }
    }

    /// Returns true if the second operand comes from the instruction's
    /// immediate field rather than a register.
    pub fn uses_immediate(self) -> bool {
        use Opcode::*;
        matches!(self, Daddi | Dsubi | Ori | Xori | Slti | Dsll | Dsrl | Dsra)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Ld => "LD",
            Opcode::Lw => "LW",
            Opcode::LdS => "L.S",
            Opcode::LdD => "L.D",
            Opcode::Sd => "SD",
            Opcode::Sw => "SW",
            Opcode::SdS => "S.S",
            Opcode::SdD => "S.D",
            Opcode::Dadd => "DADD",
            Opcode::Daddi => "DADDI",
            Opcode::Dsub => "DSUB",
            Opcode::Dsubi => "DSUBI",
            Opcode::Dmul => "DMUL",
            Opcode::Ddiv => "DDIV",
            Opcode::Or => "OR",
            Opcode::Ori => "ORI",
            Opcode::Xor => "XOR",
            Opcode::Xori => "XORI",
            Opcode::Slt => "SLT",
            Opcode::Slti => "SLTI",
            Opcode::Dsll => "DSLL",
            Opcode::Dsrl => "DSRL",
            Opcode::Dsra => "DSRA",
            Opcode::AddD => "ADD.D",
            Opcode::SubD => "SUB.D",
            Opcode::AddS => "ADD.S",
            Opcode::SubS => "SUB.S",
            Opcode::MulD => "MUL.D",
            Opcode::DivD => "DIV.D",
            Opcode::MulS => "MUL.S",
            Opcode::DivS => "DIV.S",
            Opcode::Beq => "BEQ",
            Opcode::Bne => "BNE",
        };
        f.write_str(name)
    }
}

/// An immutable decoded instruction.
///
/// Register fields are flat indices into the unified register file
/// (`0..32` integer, `32..64` floating-point); `None` means the field is
/// unused by this opcode. Branch targets are program indices carried in
/// `immediate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register, if any.
    pub dest: Option<usize>,
    /// First source register, if any.
    pub src1: Option<usize>,
    /// Second source register, if any.
    pub src2: Option<usize>,
    /// Base register for memory operations.
    pub base: Option<usize>,
    /// Byte offset for memory operations.
    pub offset: i64,
    /// Immediate operand, or branch target program index.
    pub immediate: i64,
}

impl Instruction {
    /// Builds a load: `op dest, offset(base)`.
    pub fn load(opcode: Opcode, dest: usize, base: usize, offset: i64) -> Self {
        Self {
            opcode,
            dest: Some(dest),
            src1: None,
            src2: None,
            base: Some(base),
            offset,
            immediate: 0,
        }
    }

    /// Builds a store: `op src, offset(base)`.
    pub fn store(opcode: Opcode, src: usize, base: usize, offset: i64) -> Self {
        Self {
            opcode,
            dest: None,
            src1: Some(src),
            src2: None,
            base: Some(base),
            offset,
            immediate: 0,
        }
    }

    /// Builds a three-register arithmetic instruction: `op dest, src1, src2`.
    pub fn arith(opcode: Opcode, dest: usize, src1: usize, src2: usize) -> Self {
        Self {
            opcode,
            dest: Some(dest),
            src1: Some(src1),
            src2: Some(src2),
            base: None,
            offset: 0,
            immediate: 0,
        }
    }

    /// Builds an immediate arithmetic instruction: `op dest, src1, imm`.
    pub fn arith_imm(opcode: Opcode, dest: usize, src1: usize, immediate: i64) -> Self {
        Self {
            opcode,
            dest: Some(dest),
            src1: Some(src1),
            src2: None,
            base: None,
            offset: 0,
            immediate,
        }
    }

    /// Builds a conditional branch: `op src1, src2, target`.
    ///
    /// `target` is the program index jumped to when the branch is taken.
    pub fn branch(opcode: Opcode, src1: usize, src2: usize, target: usize) -> Self {
        Self {
            opcode,
            dest: None,
            src1: Some(src1),
            src2: Some(src2),
            base: None,
            offset: 0,
            immediate: target as i64,
        }
    }

    /// Returns the structural class.
    #[inline]
    pub fn class(&self) -> InstrClass {
        self.opcode.class()
    }

    /// Returns true for load opcodes.
    #[inline]
    pub fn is_load(&self) -> bool {
        self.class() == InstrClass::Load
    }

    /// Returns true for store opcodes.
    #[inline]
    pub fn is_store(&self) -> bool {
        self.class() == InstrClass::Store
    }

    /// Returns true for FP add/sub opcodes.
    #[inline]
    pub fn is_fp_add_sub(&self) -> bool {
        self.class() == InstrClass::FpAddSub
    }

    /// Returns true for FP mul/div opcodes.
    #[inline]
    pub fn is_fp_mul_div(&self) -> bool {
        self.class() == InstrClass::FpMulDiv
    }

    /// Returns true for integer ALU opcodes.
    #[inline]
    pub fn is_int_alu(&self) -> bool {
        self.class() == InstrClass::IntAlu
    }

    /// Returns true for conditional branches.
    #[inline]
    pub fn is_branch(&self) -> bool {
        self.class() == InstrClass::Branch
    }

    /// Returns true if the instruction reads a second source register.
    pub fn uses_second_source(&self) -> bool {
        self.src2.is_some() && !self.opcode.uses_immediate()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class() {
            InstrClass::Load => write!(
                f,
                "{} {}, {}({})",
                self.opcode,
                reg_name(self.dest.unwrap_or(0)),
                self.offset,
                reg_name(self.base.unwrap_or(0)),
            ),
            InstrClass::Store => write!(
                f,
                "{} {}, {}({})",
                self.opcode,
                reg_name(self.src1.unwrap_or(0)),
                self.offset,
                reg_name(self.base.unwrap_or(0)),
            ),
            InstrClass::Branch => write!(
                f,
                "{} {}, {}, {}",
                self.opcode,
                reg_name(self.src1.unwrap_or(0)),
                reg_name(self.src2.unwrap_or(0)),
                self.immediate,
            ),
            _ => {
                if self.opcode.uses_immediate() {
                    write!(
                        f,
                        "{} {}, {}, {}",
                        self.opcode,
                        reg_name(self.dest.unwrap_or(0)),
                        reg_name(self.src1.unwrap_or(0)),
                        self.immediate,
                    )
                } else {
                    write!(
                        f,
                        "{} {}, {}, {}",
                        self.opcode,
                        reg_name(self.dest.unwrap_or(0)),
                        reg_name(self.src1.unwrap_or(0)),
                        reg_name(self.src2.unwrap_or(0)),
                    )
                }
            }
        }
    }
}
