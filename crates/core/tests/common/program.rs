use tomasim_core::common::reg::fp;
use tomasim_core::isa::{Instruction, Opcode};

/// The classic RAW-chain program:
///
/// ```text
/// L.D   F6, 0(R2)
/// L.D   F2, 8(R2)
/// MUL.D F0, F2, F4
/// SUB.D F8, F2, F6
/// DIV.D F10, F0, F6
/// ADD.D F6, F8, F2
/// S.D   F6, 8(R2)
/// ```
pub fn raw_chain() -> Vec<Instruction> {
    vec![
        Instruction::load(Opcode::LdD, fp(6), 2, 0),
        Instruction::load(Opcode::LdD, fp(2), 2, 8),
        Instruction::arith(Opcode::MulD, fp(0), fp(2), fp(4)),
        Instruction::arith(Opcode::SubD, fp(8), fp(2), fp(6)),
        Instruction::arith(Opcode::DivD, fp(10), fp(0), fp(6)),
        Instruction::arith(Opcode::AddD, fp(6), fp(8), fp(2)),
        Instruction::store(Opcode::SdD, fp(6), 2, 8),
    ]
}

/// A run of `n` independent integer immediates writing `R1..=Rn`.
pub fn independent_ints(n: usize) -> Vec<Instruction> {
    (0..n)
        .map(|i| Instruction::arith_imm(Opcode::Daddi, i + 1, 0, (i + 1) as i64))
        .collect()
}
