//! The `error` module defines the [`BinDiffError`] enum that describes the errors that
//! can occur when loading byte sources, sizing the diff map, or reading from a source.
//!
//! None of these errors are fatal:
//! 1. A failed load leaves the previously loaded source (if any) in place.
//! 2. A failed diff map allocation disables diffing, the views keep working uncolored.
//! 3. An out-of-bounds read fails closed instead of touching adjacent memory.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinDiffError {
    /// File could not be opened or memory mapped
    #[error("Could not open '{}' for reading:\n{source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Diff map of the requested size could not be allocated
    #[error("Could not allocate a diff map of {bytes} bytes, diffing is disabled")]
    AllocationFailure { bytes: u64 },
    /// Requested offset lies beyond the end of the source
    #[error("Read at offset 0x{offset:X} is out of bounds for a source of {length} bytes")]
    OutOfBoundsRead { offset: u64, length: u64 },
}

impl BinDiffError {
    /// Returns `true` for errors that leave diffing disabled until the next load.
    #[must_use]
    pub const fn disables_diffing(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        // Arrange
        let oob = BinDiffError::OutOfBoundsRead {
            offset: 0x10,
            length: 4,
        };
        let alloc = BinDiffError::AllocationFailure { bytes: 123 };
        let unavailable = BinDiffError::SourceUnavailable {
            path: PathBuf::from("missing.bin"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        // Act & Assert
        assert!(oob.to_string().contains("0x10"));
        assert!(alloc.to_string().contains("123 bytes"));
        assert!(unavailable.to_string().contains("missing.bin"));
        assert!(alloc.disables_diffing());
        assert!(!oob.disables_diffing());
    }
}
