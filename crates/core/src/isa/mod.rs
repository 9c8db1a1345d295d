//! Instruction set definitions.
//!
//! The opcode set is closed: loads, stores, integer arithmetic/logical,
//! FP add/sub, FP mul/div, and the two conditional branches. Classification
//! is a pure, total function of the opcode, so an unclassifiable instruction
//! cannot reach execution.

/// Opcodes, instruction records, and classification predicates.
pub mod instruction;

pub use instruction::{InstrClass, Instruction, Opcode};
