//! An emulator for the LS-8, an 8-bit machine with 256 bytes of memory, eight
//! registers and a stack that shares memory with the program.
//!
//! ```
//! use ls8::memory::StdMem;
//! use ls8::processor::{Instruction::*, Processor, State};
//! use ls8::write_instructions;
//!
//! let mut mem = StdMem::default();
//! write_instructions!(mem : 0 => LDI, 0, 8, PRN, 0, HLT).unwrap();
//!
//! let mut cpu = Processor::default();
//! let mut out = Vec::new();
//! cpu.execute_until_halt(&mut mem, &mut out).unwrap();
//!
//! assert_eq!(out, b"8\n");
//! assert_eq!(cpu.state, State::Halted);
//! ```

pub mod alu;
pub mod error;
pub mod memory;
pub mod processor;
pub mod registers;
