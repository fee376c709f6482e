//! Main memory image with bounds-checked byte and little-endian word access.

/// Bounds policy helpers for byte and word accesses.
pub mod access;
/// Fixed memory geometry and program-image placement.
pub mod map;

pub use access::{validate_byte_access, validate_range, validate_word_access, word_byte_offset};
pub use map::{HEADER_BYTES, HEADER_START, MEMORY_BYTES, PROGRAM_ORIGIN, WORD_BYTES};

use crate::{AccessKind, MachineFault};

/// Flat byte-addressable main memory.
///
/// Words are assembled and disassembled explicitly in little-endian order so
/// behavior does not depend on the host.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MEMORY_BYTES)
    }
}

impl Memory {
    /// Allocates a zeroed memory of `len` bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; len].into_boxed_slice(),
        }
    }

    /// Capacity in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-capacity memory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read-only view of the whole image.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads the byte at byte address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::MemoryOutOfBounds`] when `addr` is past the end.
    pub fn read_byte(&self, addr: u32) -> Result<u8, MachineFault> {
        let index = validate_byte_access(addr, self.len(), AccessKind::Fetch)?;
        Ok(self.bytes[index])
    }

    /// Writes the byte at byte address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::MemoryOutOfBounds`] when `addr` is past the end.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), MachineFault> {
        let index = validate_byte_access(addr, self.len(), AccessKind::Load)?;
        self.bytes[index] = value;
        Ok(())
    }

    /// Reads the little-endian word at word address `word_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::MemoryOutOfBounds`] when any of the four bytes
    /// is past the end.
    pub fn read_word(&self, word_addr: u32) -> Result<u32, MachineFault> {
        let start = validate_word_access(word_addr, self.len(), AccessKind::WordRead)?;
        let mut raw = [0u8; WORD_BYTES];
        raw.copy_from_slice(&self.bytes[start..start + WORD_BYTES]);
        Ok(u32::from_le_bytes(raw))
    }

    /// Writes `value` little-endian at word address `word_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::MemoryOutOfBounds`] when any of the four bytes
    /// is past the end.
    pub fn write_word(&mut self, word_addr: u32, value: u32) -> Result<(), MachineFault> {
        let start = validate_word_access(word_addr, self.len(), AccessKind::WordWrite)?;
        self.bytes[start..start + WORD_BYTES].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Copies `data` into memory starting at byte offset `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`MachineFault::MemoryOutOfBounds`] when the slice does not fit;
    /// memory is left untouched in that case.
    pub fn load_at(&mut self, offset: usize, data: &[u8]) -> Result<(), MachineFault> {
        let start = validate_range(offset as u64, data.len(), self.len(), AccessKind::Load)?;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}
