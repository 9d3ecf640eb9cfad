use std::convert::TryFrom;
use std::io::Write;

use crate::alu::{self, AluOp};
use crate::error::{Fault, Result};
use crate::memory::{Byte, Memory, Word};
use crate::registers::{Flags, RegisterFile};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

/// Where the processor is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Fetching and executing instructions
    Running,
    /// Stopped by `HLT`
    Halted,
    /// Stopped by a fault; no further instruction will run
    Faulted(Fault),
}

/// What an instruction handler asks the processor to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Value the program counter takes after this instruction
    pub next_pc: Word,
    /// `false` once the program asked to halt
    pub proceed: bool,
}

impl Step {
    fn jump(next_pc: Word) -> Self {
        Self {
            next_pc,
            proceed: true,
        }
    }

    fn halt(pc: Word) -> Self {
        Self {
            next_pc: pc,
            proceed: false,
        }
    }
}

/// Emulates a CPU
///
/// The processor owns every piece of machine state except the memory, which is
/// passed to each call so a program can be inspected between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Word,
    /// Stack Pointer. Wraps around the 256 addresses it can name, so the first
    /// `CALL` writes to the top of memory.
    pub sp: Byte,
    /// General-purpose registers and condition flags
    pub registers: RegisterFile,
    /// Lifecycle state
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU
    fn default() -> Self {
        Self::new(0x00)
    }
}

impl Processor {
    /// Initializes a new CPU
    /// @param entrypoint The start of the program
    pub fn new(entrypoint: Word) -> Self {
        Self {
            pc: entrypoint,
            sp: 0x00,
            registers: RegisterFile::default(),
            state: State::Running,
        }
    }

    /// Executes a single, already decoded instruction and reports where to go next.
    ///
    /// Operands the instruction does not use are ignored.
    pub fn execute_instruction<const S: usize, W: Write>(
        &mut self,
        instruction: Instruction,
        operand_a: Byte,
        operand_b: Byte,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<Step> {
        let fall_through = Step::jump(self.pc.wrapping_add(instruction.size()));

        let step = match instruction {
            Instruction::HLT => {
                debug!("HLT");

                Step::halt(self.pc)
            }
            Instruction::RET => {
                let addr = memory.read_byte(self.sp as Word)?;
                self.sp = self.sp.wrapping_add(1);

                debug!("RET {}", addr);

                Step::jump(addr as Word)
            }
            Instruction::PUSH => {
                let value = self.registers.get(operand_a)?;

                // write value to stack
                let sp = self.sp.wrapping_add(1);
                memory.write_byte(sp as Word, value)?;
                self.sp = sp;

                debug!("PUSH R{}: {}", operand_a, value);

                fall_through
            }
            Instruction::POP => {
                let value = memory.read_byte(self.sp as Word)?;
                self.registers.set(operand_a, value)?;
                self.sp = self.sp.wrapping_sub(1);

                debug!("POP R{}: {}", operand_a, value);

                fall_through
            }
            Instruction::PRN => {
                let value = self.registers.get(operand_a)?;
                writeln!(out, "{}", value).map_err(|err| Fault::Output(err.kind()))?;

                debug!("PRN R{}: {}", operand_a, value);

                fall_through
            }
            Instruction::CALL => {
                let addr = self.registers.get(operand_a)?;
                let return_addr = self.pc.wrapping_add(instruction.size());
                let return_byte =
                    Byte::try_from(return_addr).map_err(|_| Fault::AddressOutOfBounds {
                        address: return_addr as usize,
                    })?;

                // write return address to stack
                let sp = self.sp.wrapping_sub(1);
                memory.write_byte(sp as Word, return_byte)?;
                self.sp = sp;

                debug!("CALL R{}: {} (return to {})", operand_a, addr, return_addr);

                Step::jump(addr as Word)
            }
            Instruction::JMP => {
                let addr = self.registers.get(operand_a)?;

                debug!("JMP R{}: {}", operand_a, addr);

                Step::jump(addr as Word)
            }
            Instruction::JEQ | Instruction::JNE => {
                let addr = self.registers.get(operand_a)?;
                let equal = self.registers.flags.contains(Flags::EQUAL);
                let taken = equal == (instruction == Instruction::JEQ);

                debug!("{} R{}: {} (taken: {})", instruction, operand_a, addr, taken);

                if taken {
                    Step::jump(addr as Word)
                } else {
                    fall_through
                }
            }
            Instruction::LDI => {
                self.registers.set(operand_a, operand_b)?;

                debug!("LDI R{} {}", operand_a, operand_b);

                fall_through
            }
            Instruction::ADD | Instruction::MUL | Instruction::CMP => {
                alu::apply(
                    AluOp::try_from(instruction)?,
                    &mut self.registers,
                    operand_a,
                    operand_b,
                )?;

                debug!(
                    "{} R{} R{}: {} {:?}",
                    instruction,
                    operand_a,
                    operand_b,
                    self.registers.get(operand_a)?,
                    self.registers.flags
                );

                fall_through
            }
        };

        Ok(step)
    }

    /// Runs one execution step
    ///
    /// Does nothing once the processor has halted or faulted. A fault is stored in
    /// [`Processor::state`] and returned.
    pub fn execute<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<()> {
        if self.state != State::Running {
            return Ok(());
        }

        match self.fetch_and_execute(memory, out) {
            Ok(step) => {
                self.pc = step.next_pc;
                if !step.proceed {
                    self.state = State::Halted;
                }

                Ok(())
            }
            Err(fault) => {
                error!("Fault at 0x{:02X}: {}", self.pc, fault);
                self.state = State::Faulted(fault);

                Err(fault)
            }
        }
    }

    fn fetch_and_execute<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<Step> {
        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace(memory));
        }

        let opcode = memory.read_byte(self.pc)?; // Read opcode where PC is
        let instruction = Instruction::try_from(opcode).map_err(|_| Fault::InvalidOpcode {
            opcode,
            pc: self.pc,
        })?;

        // only fetch the operands the instruction actually has
        let mut operands = [0; 2];
        for (offset, operand) in operands
            .iter_mut()
            .take(instruction.operand_count() as usize)
            .enumerate()
        {
            *operand = memory.read_byte(self.pc.wrapping_add(offset as Word + 1))?;
        }

        self.execute_instruction(instruction, operands[0], operands[1], memory, out)
    }

    /// Run program until it halts or faults
    pub fn execute_until_halt<const S: usize, W: Write>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<()> {
        while self.state == State::Running {
            self.execute(memory, out)?;
        }

        match self.state {
            State::Faulted(fault) => Err(fault),
            _ => {
                info!("Program halted at 0x{:02X}", self.pc);
                Ok(())
            }
        }
    }

    /// Formats the program counter, the three bytes from it on and every register
    /// as one line of hex. Bytes past the end of memory show as `--`.
    pub fn trace<const S: usize>(&self, memory: &Memory<S>) -> String {
        let byte = |offset: usize| {
            memory
                .peek(self.pc as usize + offset)
                .map_or_else(|| "--".to_string(), |value| format!("{:02X}", value))
        };

        format!(
            "TRACE: {:02X} | {} {} {} | {}",
            self.pc,
            byte(0),
            byte(1),
            byte(2),
            self.registers
        )
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions
        ///
        /// The top two bits of every opcode hold its operand count.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0x01,
    /// Return from a subroutine to the address on top of the stack
    RET = 0x11,
    /// Push a register onto the stack
    /// @param register The register to push
    PUSH = 0x45,
    /// Pop the top of the stack into a register
    /// @param register The register to pop into
    POP = 0x46,
    /// Print the decimal value of a register
    /// @param register The register to print
    PRN = 0x47,
    /// Push the address of the next instruction and jump to a subroutine
    /// @param register The register holding the subroutine address
    CALL = 0x50,
    /// Jump to an address
    /// @param register The register holding the address
    JMP = 0x54,
    /// Jump if the equal flag is set
    /// @param register The register holding the address
    JEQ = 0x55,
    /// Jump if the equal flag is clear
    /// @param register The register holding the address
    JNE = 0x56,
    /// Load an immediate into a register
    /// @param register The register to load into
    /// @param value The value to load
    LDI = 0x82,
    /// Add two registers, storing the result in the first
    ADD = 0xA0,
    /// Multiply two registers, storing the result in the first
    MUL = 0xA2,
    /// Compare two registers and set the condition flags
    CMP = 0xA7,
}

impl Instruction {
    /// Number of operand bytes following the opcode
    pub fn operand_count(&self) -> Word {
        Word::from(Byte::from(*self) >> 6)
    }

    /// Length of the encoded instruction in bytes
    pub fn size(&self) -> Word {
        1 + self.operand_count()
    }
}
