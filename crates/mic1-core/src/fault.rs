use std::fmt;

use thiserror::Error;

/// Kind of memory access that produced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessKind {
    /// Opcode byte fetch at `PC`.
    Fetch,
    /// Word read at `MAR`.
    WordRead,
    /// Word write at `MAR`.
    WordWrite,
    /// Host-side image load into memory.
    Load,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Fetch => "byte fetch",
            Self::WordRead => "word read",
            Self::WordWrite => "word write",
            Self::Load => "image load",
        };
        f.write_str(label)
    }
}

/// Fatal datapath faults.
///
/// Undefined B-bus selectors and ALU opcodes are deliberately absent: they
/// produce fallback bus values instead of faulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MachineFault {
    /// A byte or word access computed an offset outside the memory image.
    #[error("{kind} out of bounds at byte address 0x{addr:X}")]
    MemoryOutOfBounds {
        /// Access that was attempted.
        kind: AccessKind,
        /// First byte offset of the rejected access.
        addr: u64,
    },
}

impl MachineFault {
    /// Stable numeric code, used as the process exit status by hosts.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::MemoryOutOfBounds { .. } => 0x01,
        }
    }

    /// Byte offset that triggered the fault.
    #[must_use]
    pub const fn addr(self) -> u64 {
        match self {
            Self::MemoryOutOfBounds { addr, .. } => addr,
        }
    }

    /// Access kind that triggered the fault.
    #[must_use]
    pub const fn kind(self) -> AccessKind {
        match self {
            Self::MemoryOutOfBounds { kind, .. } => kind,
        }
    }
}
