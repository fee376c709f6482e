//! Fixed memory geometry and program-image placement.

/// Size in bytes of the flat main memory.
pub const MEMORY_BYTES: usize = 100_000_000;
/// Bytes per architectural word.
pub const WORD_BYTES: usize = 4;
/// Inclusive start of the header region of a program image.
pub const HEADER_START: usize = 0x0000;
/// Length of the header region copied from a program image.
pub const HEADER_BYTES: usize = 20;
/// Byte address at which the program body is placed.
pub const PROGRAM_ORIGIN: usize = 0x0401;

const _: () = assert!(
    HEADER_START + HEADER_BYTES <= PROGRAM_ORIGIN,
    "header must not overlap the program body"
);
const _: () = assert!(
    PROGRAM_ORIGIN < MEMORY_BYTES,
    "program origin must lie inside memory"
);
