//! Immutable microprogram control store.

use crate::encoding::MICROINSTRUCTION_MASK;
use crate::state::MPC_MASK;

/// Number of microinstructions in the control store.
pub const CONTROL_STORE_SIZE: usize = 512;
/// Bytes per ROM record (one little-endian `u64`).
pub const ROM_RECORD_BYTES: usize = 8;
/// Total bytes consumed from a microprogram ROM.
pub const CONTROL_STORE_BYTES: usize = CONTROL_STORE_SIZE * ROM_RECORD_BYTES;

const _: () = assert!(CONTROL_STORE_SIZE == MPC_MASK as usize + 1);

/// 512-entry microcode ROM addressed by `MPC`.
///
/// Entries are masked to 36 bits on construction and never change afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ControlStore {
    words: Box<[u64; CONTROL_STORE_SIZE]>,
}

impl std::fmt::Debug for ControlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let populated = self.words.iter().filter(|word| **word != 0).count();
        f.debug_struct("ControlStore")
            .field("populated", &populated)
            .finish_non_exhaustive()
    }
}

impl Default for ControlStore {
    fn default() -> Self {
        Self {
            words: Box::new([0; CONTROL_STORE_SIZE]),
        }
    }
}

impl ControlStore {
    /// Builds a control store from 512 raw words.
    #[must_use]
    pub fn from_words(words: [u64; CONTROL_STORE_SIZE]) -> Self {
        Self {
            words: Box::new(words.map(|word| word & MICROINSTRUCTION_MASK)),
        }
    }

    /// Builds a control store from the exact ROM byte image (512 little-endian
    /// 8-byte records).
    #[must_use]
    pub fn from_rom_bytes(bytes: &[u8; CONTROL_STORE_BYTES]) -> Self {
        let mut words = [0u64; CONTROL_STORE_SIZE];
        for (word, record) in words.iter_mut().zip(bytes.chunks_exact(ROM_RECORD_BYTES)) {
            let mut raw = [0u8; ROM_RECORD_BYTES];
            raw.copy_from_slice(record);
            *word = u64::from_le_bytes(raw);
        }
        Self::from_words(words)
    }

    /// Builds a sparse control store; unspecified addresses hold zero.
    /// Addresses are taken modulo 512.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (u16, u64)>) -> Self {
        let mut words = [0u64; CONTROL_STORE_SIZE];
        for (addr, word) in entries {
            words[usize::from(addr & MPC_MASK)] = word;
        }
        Self::from_words(words)
    }

    /// Microinstruction at `mpc` (taken modulo 512).
    #[must_use]
    pub fn get(&self, mpc: u16) -> u64 {
        self.words[usize::from(mpc & MPC_MASK)]
    }

    /// All microinstructions in address order.
    #[must_use]
    pub fn words(&self) -> &[u64; CONTROL_STORE_SIZE] {
        &self.words
    }
}
