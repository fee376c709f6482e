//! Microprogram ROM and program image loading.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::control_store::{ControlStore, CONTROL_STORE_BYTES};
use crate::memory::{Memory, HEADER_BYTES, HEADER_START};

/// Bytes of the little-endian size prefix at the start of a program image.
pub const IMAGE_SIZE_PREFIX_BYTES: usize = 4;

/// Errors raised while loading the control store or a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Reading failed part way through the file.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file ended before a required region was complete.
    #[error("{}: truncated {what}: expected {expected} bytes, got {actual}", path.display())]
    Truncated {
        /// File being read.
        path: PathBuf,
        /// Region that was cut short.
        what: &'static str,
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },
    /// The size prefix is smaller than the header it must include.
    #[error("{}: image size {size} is smaller than the {HEADER_BYTES}-byte header", path.display())]
    InvalidImageSize {
        /// Program image path.
        path: PathBuf,
        /// Declared size.
        size: u32,
    },
    /// The program body does not fit in memory at the load origin.
    #[error("{}: image size {size} does not fit in {capacity} bytes of memory", path.display())]
    ImageTooLarge {
        /// Program image path.
        path: PathBuf,
        /// Declared size.
        size: u32,
        /// Memory size in bytes.
        capacity: usize,
    },
}

/// Placement of a loaded program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramImage {
    /// Size prefix as declared by the file, header included.
    pub size: u32,
    /// Bytes copied to the program origin.
    pub body_len: usize,
}

/// Opens and parses a microprogram ROM file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or holds fewer than
/// 512 records.
pub fn load_control_store(path: &Path) -> Result<ControlStore, LoadError> {
    let file = open(path)?;
    read_control_store(BufReader::new(file), path)
}

/// Parses 512 little-endian 8-byte records from `reader`. Bytes past the last
/// record are ignored.
///
/// # Errors
///
/// Returns [`LoadError::Truncated`] on a short read. `path` only labels errors.
pub fn read_control_store<R: Read>(reader: R, path: &Path) -> Result<ControlStore, LoadError> {
    let mut bytes = Vec::with_capacity(CONTROL_STORE_BYTES);
    reader
        .take(CONTROL_STORE_BYTES as u64)
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let Ok(rom) = <&[u8; CONTROL_STORE_BYTES]>::try_from(bytes.as_slice()) else {
        return Err(LoadError::Truncated {
            path: path.to_path_buf(),
            what: "microprogram",
            expected: CONTROL_STORE_BYTES,
            actual: bytes.len(),
        });
    };

    tracing::debug!(path = %path.display(), bytes = CONTROL_STORE_BYTES, "loaded control store");
    Ok(ControlStore::from_rom_bytes(rom))
}

/// Opens a program image and copies it into `memory`.
///
/// # Errors
///
/// See [`read_program`].
pub fn load_program(
    path: &Path,
    memory: &mut Memory,
    origin: usize,
) -> Result<ProgramImage, LoadError> {
    let file = open(path)?;
    read_program(BufReader::new(file), path, memory, origin)
}

/// Reads a size-prefixed program image: the first 20 bytes after the prefix
/// go to address 0, the remaining `size - 20` bytes to `origin`.
///
/// # Errors
///
/// Returns [`LoadError`] when the size is below the header length, the body
/// does not fit in memory, or either region is cut short. Memory may hold a
/// partially copied header when a later region fails.
pub fn read_program<R: Read>(
    mut reader: R,
    path: &Path,
    memory: &mut Memory,
    origin: usize,
) -> Result<ProgramImage, LoadError> {
    let mut prefix = [0u8; IMAGE_SIZE_PREFIX_BYTES];
    read_region(&mut reader, path, "size prefix", &mut prefix)?;
    let size = u32::from_le_bytes(prefix);
    let capacity = memory.len();

    let Some(body_len) = (size as usize).checked_sub(HEADER_BYTES) else {
        return Err(LoadError::InvalidImageSize {
            path: path.to_path_buf(),
            size,
        });
    };
    let fits = origin
        .checked_add(body_len)
        .is_some_and(|end| end <= capacity)
        && HEADER_START + HEADER_BYTES <= capacity;
    if !fits {
        return Err(LoadError::ImageTooLarge {
            path: path.to_path_buf(),
            size,
            capacity,
        });
    }

    let mut header = [0u8; HEADER_BYTES];
    read_region(&mut reader, path, "header", &mut header)?;
    let mut body = vec![0u8; body_len];
    read_region(&mut reader, path, "program body", &mut body)?;

    let too_large = |_| LoadError::ImageTooLarge {
        path: path.to_path_buf(),
        size,
        capacity,
    };
    memory.load_at(HEADER_START, &header).map_err(too_large)?;
    memory.load_at(origin, &body).map_err(too_large)?;

    tracing::debug!(path = %path.display(), size, body_len, origin, "loaded program image");
    Ok(ProgramImage { size, body_len })
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_region<R: Read>(
    reader: &mut R,
    path: &Path,
    what: &'static str,
    buf: &mut [u8],
) -> Result<(), LoadError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(LoadError::Truncated {
                    path: path.to_path_buf(),
                    what,
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
    Ok(())
}
