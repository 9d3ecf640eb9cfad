//! Arithmetic and comparison over two registers.

use std::cmp::Ordering;
use std::convert::TryFrom;

use crate::error::{Fault, Result};
use crate::memory::Byte;
use crate::processor::Instruction;
use crate::registers::{Flags, RegisterFile};

/// Operations the ALU can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// `ra = ra + rb`, wrapping
    Add,
    /// `ra = ra * rb`, wrapping
    Mul,
    /// Sets exactly one of the condition flags from `ra` and `rb`
    Cmp,
}

impl TryFrom<Instruction> for AluOp {
    type Error = Fault;

    fn try_from(instruction: Instruction) -> Result<Self> {
        match instruction {
            Instruction::ADD => Ok(AluOp::Add),
            Instruction::MUL => Ok(AluOp::Mul),
            Instruction::CMP => Ok(AluOp::Cmp),
            other => Err(Fault::UnsupportedAluOperation(other)),
        }
    }
}

/// Applies `op` to registers `reg_a` and `reg_b`.
///
/// `Cmp` clears all three flags before setting one.
pub fn apply(op: AluOp, registers: &mut RegisterFile, reg_a: Byte, reg_b: Byte) -> Result<()> {
    let a = registers.get(reg_a)?;
    let b = registers.get(reg_b)?;

    match op {
        AluOp::Add => registers.set(reg_a, a.wrapping_add(b))?,
        AluOp::Mul => registers.set(reg_a, a.wrapping_mul(b))?,
        AluOp::Cmp => {
            registers.flags = match a.cmp(&b) {
                Ordering::Less => Flags::LESS,
                Ordering::Equal => Flags::EQUAL,
                Ordering::Greater => Flags::GREATER,
            };
        }
    }

    Ok(())
}
