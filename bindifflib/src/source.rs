//! The `source` module provides the [`ByteSource`] trait, the read-only contract the diff
//! engine needs from a loaded file, and its two implementations:
//! - [`MappedFile`] memory maps a file from disk (via `memmap2`), so multi-gigabyte
//!   files are never read into RAM as a whole.
//! - [`MemorySource`] wraps an owned in-memory buffer.
//!
//! Every read is bounds checked and fails closed with [`BinDiffError::OutOfBoundsRead`].

use crate::error::BinDiffError;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only, length-bounded view over a contiguous run of bytes.
///
/// A source is never mutated in place. Loading a new file replaces the whole source.
pub trait ByteSource {
    /// Exact length of the source in bytes.
    fn len(&self) -> u64;

    /// Borrow `count` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`BinDiffError::OutOfBoundsRead`] if any requested byte lies beyond
    /// the end of the source.
    fn read(&self, offset: u64, count: usize) -> Result<&[u8], BinDiffError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the single byte at `offset`.
    ///
    /// # Errors
    /// Returns [`BinDiffError::OutOfBoundsRead`] if `offset >= len()`.
    fn byte_at(&self, offset: u64) -> Result<u8, BinDiffError> {
        let slice = self.read(offset, 1)?;
        slice.first().copied().ok_or(BinDiffError::OutOfBoundsRead {
            offset,
            length: self.len(),
        })
    }
}

/// Shared bounds check for sources backed by a plain byte slice
fn checked_slice(data: &[u8], offset: u64, count: usize) -> Result<&[u8], BinDiffError> {
    let length = data.len() as u64;
    let oob = || BinDiffError::OutOfBoundsRead {
        offset: offset.max(length),
        length,
    };

    let start = usize::try_from(offset).map_err(|_| oob())?;
    let end = start.checked_add(count).ok_or_else(oob)?;

    data.get(start..end).ok_or_else(oob)
}

/// File on disk, memory mapped read-only for the lifetime of this value.
///
/// Dropping a `MappedFile` unmaps the file and closes the handle.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    /// `None` for empty files, which cannot be mapped on every platform
    mmap: Option<Mmap>,
}

impl MappedFile {
    /// Open and memory map the file at `path`.
    ///
    /// # Errors
    /// Returns [`BinDiffError::SourceUnavailable`] if the file cannot be opened,
    /// queried for its size, or mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BinDiffError> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source: std::io::Error| BinDiffError::SourceUnavailable {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        let size = file.metadata().map_err(unavailable)?.len();

        let mmap = if size == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only. Modifying the file on disk while it is
            // mapped is outside of what this program guards against, same as any viewer.
            Some(unsafe { Mmap::map(&file) }.map_err(unavailable)?)
        };

        log::info!("Mapped '{}' ({size} bytes)", path.display());

        Ok(Self { path, mmap })
    }

    /// Path the file was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display purposes
    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || "Untitled".to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or_default()
    }
}

impl ByteSource for MappedFile {
    fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    fn read(&self, offset: u64, count: usize) -> Result<&[u8], BinDiffError> {
        checked_slice(self.bytes(), offset, count)
    }
}

/// Owned in-memory buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for MemorySource {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&self, offset: u64, count: usize) -> Result<&[u8], BinDiffError> {
        checked_slice(&self.data, offset, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_at_valid() {
        // Arrange
        let src = MemorySource::from(vec![0x00, 0x11, 0x22]);

        // Act
        let byte = src.byte_at(2);

        // Assert
        assert_eq!(byte.ok(), Some(0x22));
    }

    #[test]
    fn test_byte_at_fails_closed() {
        // Arrange
        let src = MemorySource::from(vec![0x00, 0x11, 0x22]);

        // Act
        let res = src.byte_at(3);

        // Assert
        assert!(matches!(
            res,
            Err(BinDiffError::OutOfBoundsRead {
                offset: 3,
                length: 3
            })
        ));
    }

    #[test]
    fn test_read_range() {
        // Arrange
        let src = MemorySource::from(&b"abcdef"[..]);

        // Act & Assert
        assert_eq!(src.read(1, 3).ok(), Some(&b"bcd"[..]));
        assert_eq!(src.read(6, 0).ok(), Some(&b""[..]));
        assert!(src.read(4, 3).is_err());
        assert!(src.read(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_empty_source() {
        // Arrange
        let src = MemorySource::default();

        // Act & Assert
        assert!(src.is_empty());
        assert!(src.byte_at(0).is_err());
    }
}
