use crate::error::{Fault, Result};

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Number of cells the LS-8 can address
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Emulates memory for use with the CPU
///
/// Code, data and the stack all share this one flat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    ///
    /// # Errors
    ///
    /// Fails with [`Fault::AddressOutOfBounds`] if `position` is not an address of
    /// this memory.
    pub fn read_byte(&self, position: Word) -> Result<Byte> {
        self.data
            .get(position as usize)
            .copied()
            .ok_or(Fault::AddressOutOfBounds {
                address: position as usize,
            })
    }

    /// Writes a byte to the memory
    ///
    /// # Errors
    ///
    /// Fails with [`Fault::AddressOutOfBounds`] if `position` is not an address of
    /// this memory. Nothing is written in that case.
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<()> {
        let cell = self
            .data
            .get_mut(position as usize)
            .ok_or(Fault::AddressOutOfBounds {
                address: position as usize,
            })?;
        *cell = value;

        Ok(())
    }

    /// Reads a byte without faulting, for diagnostics.
    pub fn peek(&self, position: usize) -> Option<Byte> {
        self.data.get(position).copied()
    }

    /// Writes an array of bytes to the memory
    ///
    /// # Errors
    ///
    /// Fails with [`Fault::AddressOutOfBounds`], naming the first address that does not
    /// exist, if `data` does not fit. The memory is left untouched in that case.
    pub fn write_array(&mut self, position: Word, data: &[Byte]) -> Result<()> {
        let start = position as usize;
        let end = start + data.len();
        if end > S {
            return Err(Fault::AddressOutOfBounds {
                address: start.max(S),
            });
        }

        self.data[start..end].copy_from_slice(data);

        Ok(())
    }
}

/// Writes a block of instructions directly into the memory
///
/// Evaluates to the [`Result`] of [`Memory::write_array`].
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
