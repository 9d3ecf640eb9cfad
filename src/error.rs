//! Defines the [`Fault`] type, the reasons a running program can be stopped early.

use std::io;

use thiserror::Error;

use crate::memory::{Byte, Word};
use crate::processor::Instruction;

/// A fault raised while executing a program.
///
/// Every fault is terminal for the current run: the processor moves to
/// [`State::Faulted`](crate::processor::State::Faulted) and stops fetching.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// A memory access fell outside of the memory.
    #[error("memory has no address `0x{address:02X}`")]
    AddressOutOfBounds { address: usize },
    /// An instruction named a register the register file does not have.
    #[error("register `R{index}` does not exist")]
    RegisterOutOfBounds { index: Byte },
    /// The byte under the program counter is not a known opcode.
    #[error("invalid opcode `0x{opcode:02X}` at `0x{pc:02X}`")]
    InvalidOpcode { opcode: Byte, pc: Word },
    /// The ALU was asked to perform an instruction it does not implement.
    #[error("unsupported ALU operation `{0}`")]
    UnsupportedAluOperation(Instruction),
    /// Writing to the output sink failed.
    #[error("failed to write output: {0:?}")]
    Output(io::ErrorKind),
}

impl Fault {
    /// Whether this fault is one of the out-of-bounds kinds.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            Fault::AddressOutOfBounds { .. } | Fault::RegisterOutOfBounds { .. }
        )
    }
}

pub type Result<T, E = Fault> = std::result::Result<T, E>;
