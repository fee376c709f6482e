//! Bounds policy for byte and word accesses.

use crate::{AccessKind, MachineFault, WORD_BYTES};

/// Converts a word address (the `MAR` convention) to its first byte offset.
#[must_use]
pub const fn word_byte_offset(word_addr: u32) -> u64 {
    word_addr as u64 * WORD_BYTES as u64
}

/// Validates that `len` bytes starting at byte offset `addr` lie inside a
/// memory of `capacity` bytes, returning the start as an index.
///
/// # Errors
///
/// Returns [`MachineFault::MemoryOutOfBounds`] when any byte of the access
/// falls outside `0..capacity`.
pub fn validate_range(
    addr: u64,
    len: usize,
    capacity: usize,
    kind: AccessKind,
) -> Result<usize, MachineFault> {
    let fault = MachineFault::MemoryOutOfBounds { kind, addr };
    let start = usize::try_from(addr).map_err(|_| fault)?;
    let end = start.checked_add(len).ok_or(fault)?;
    if end <= capacity {
        Ok(start)
    } else {
        Err(fault)
    }
}

/// Validates a single-byte access at byte address `addr`.
///
/// # Errors
///
/// Returns [`MachineFault::MemoryOutOfBounds`] when `addr >= capacity`.
pub fn validate_byte_access(
    addr: u32,
    capacity: usize,
    kind: AccessKind,
) -> Result<usize, MachineFault> {
    validate_range(u64::from(addr), 1, capacity, kind)
}

/// Validates a four-byte access at word address `word_addr`.
///
/// # Errors
///
/// Returns [`MachineFault::MemoryOutOfBounds`] when `word_addr * 4 + 3` is
/// outside the memory image.
pub fn validate_word_access(
    word_addr: u32,
    capacity: usize,
    kind: AccessKind,
) -> Result<usize, MachineFault> {
    validate_range(word_byte_offset(word_addr), WORD_BYTES, capacity, kind)
}

#[cfg(test)]
mod tests {
    use super::{validate_byte_access, validate_range, validate_word_access, word_byte_offset};
    use crate::{AccessKind, MachineFault};

    #[test]
    fn word_offset_multiplies_by_four_without_overflow() {
        assert_eq!(word_byte_offset(0x10), 0x40);
        assert_eq!(word_byte_offset(u32::MAX), 0x3_FFFF_FFFC);
    }

    #[test]
    fn byte_access_accepts_last_byte_and_rejects_capacity() {
        assert_eq!(validate_byte_access(15, 16, AccessKind::Fetch), Ok(15));
        assert_eq!(
            validate_byte_access(16, 16, AccessKind::Fetch),
            Err(MachineFault::MemoryOutOfBounds {
                kind: AccessKind::Fetch,
                addr: 16
            })
        );
    }

    #[test]
    fn word_access_requires_all_four_bytes_in_range() {
        assert_eq!(validate_word_access(3, 16, AccessKind::WordRead), Ok(12));
        assert_eq!(
            validate_word_access(4, 16, AccessKind::WordWrite),
            Err(MachineFault::MemoryOutOfBounds {
                kind: AccessKind::WordWrite,
                addr: 16
            })
        );
        assert_eq!(
            validate_range(14, 4, 16, AccessKind::WordRead),
            Err(MachineFault::MemoryOutOfBounds {
                kind: AccessKind::WordRead,
                addr: 14
            })
        );
    }

    #[test]
    fn huge_word_address_faults_with_full_byte_offset() {
        let fault = validate_word_access(u32::MAX, 100, AccessKind::WordRead)
            .expect_err("address beyond memory must fault");
        assert_eq!(fault.addr(), 0x3_FFFF_FFFC);
    }
}
