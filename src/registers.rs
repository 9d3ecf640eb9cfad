//! The register file: eight general-purpose registers and the condition flags.

use std::fmt;

use bitflags::bitflags;

use crate::error::{Fault, Result};
use crate::memory::Byte;

/// Number of general-purpose registers
pub const REGISTER_COUNT: usize = 8;

bitflags! {
    /// Condition flags, laid out like the LS-8 `FL` register (`00000LGE`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: Byte {
        /// Equal
        const EQUAL = 0b001;
        /// Greater-than
        const GREATER = 0b010;
        /// Less-than
        const LESS = 0b100;
    }
}

/// General-purpose registers plus the condition flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegisterFile {
    /// The actual register values, `R0` through `R7`
    pub data: [Byte; REGISTER_COUNT],
    /// Flags set by `CMP`
    pub flags: Flags,
}

impl RegisterFile {
    /// Reads register `index`
    ///
    /// # Errors
    ///
    /// Fails with [`Fault::RegisterOutOfBounds`] if there is no such register.
    pub fn get(&self, index: Byte) -> Result<Byte> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(Fault::RegisterOutOfBounds { index })
    }

    /// Writes `value` into register `index`
    ///
    /// # Errors
    ///
    /// Fails with [`Fault::RegisterOutOfBounds`] if there is no such register.
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<()> {
        let register = self
            .data
            .get_mut(index as usize)
            .ok_or(Fault::RegisterOutOfBounds { index })?;
        *register = value;

        Ok(())
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_registers_start_zeroed() -> Result<()> {
        let registers = RegisterFile::default();

        for index in 0..REGISTER_COUNT as Byte {
            assert_eq!(registers.get(index)?, 0);
        }
        assert!(registers.flags.is_empty());

        Ok(())
    }

    #[test]
    fn test_set_and_get() -> Result<()> {
        let mut registers = RegisterFile::default();
        registers.set(7, 0xF4)?;

        assert_eq!(registers.get(7)?, 0xF4);
        assert_eq!(registers.data, [0, 0, 0, 0, 0, 0, 0, 0xF4]);

        Ok(())
    }

    #[test]
    fn test_register_out_of_bounds() -> Result<()> {
        let mut registers = RegisterFile::default();

        assert_eq!(registers.get(8), Err(Fault::RegisterOutOfBounds { index: 8 }));
        assert_eq!(
            registers.set(0xFF, 1),
            Err(Fault::RegisterOutOfBounds { index: 0xFF })
        );
        assert_eq!(registers, RegisterFile::default());

        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        let mut registers = RegisterFile::default();
        registers.set(0, 8)?;
        registers.set(7, 0xAB)?;

        assert_eq!(registers.to_string(), "08 00 00 00 00 00 00 AB");

        Ok(())
    }
}
