//! The 32,768-word memory array and the image loader that populates it.

use crate::error::{ImageFormatError, VmError};

/// Number of addressable words.
pub const MEMORY_SIZE: usize = 32768;

/// A fixed, word-addressable array of 32,768 words, zero-initialized.
pub struct Memory {
    words: Box<[u16; MEMORY_SIZE]>,
}

impl Memory {
    /// An empty machine: every word zero. This alone is a legal (if
    /// uninteresting) program — address 0 holds `0` (`halt`).
    pub fn new() -> Memory {
        Memory {
            words: Box::new([0u16; MEMORY_SIZE]),
        }
    }

    /// Load a program image: little-endian 16-bit words starting at
    /// address 0. Words beyond the image are left zero.
    ///
    /// Fails if the byte stream's length is odd, or if it holds more than
    /// [`MEMORY_SIZE`] words.
    pub fn load_image(bytes: &[u8]) -> Result<Memory, VmError> {
        if bytes.len() % 2 != 0 {
            return Err(VmError::ImageFormat(ImageFormatError::OddLength(
                bytes.len(),
            )));
        }
        let word_count = bytes.len() / 2;
        if word_count > MEMORY_SIZE {
            return Err(VmError::ImageFormat(ImageFormatError::TooLarge(
                word_count,
            )));
        }

        let mut mem = Memory::new();
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            mem.words[i] = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(mem)
    }

    /// Read the raw word at `addr`. Every address in `[0, 32767]` is
    /// always valid; there is no notion of an unmapped address.
    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.words[addr as usize]
    }

    /// Write the raw word at `addr`.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.words[addr as usize] = value;
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}
