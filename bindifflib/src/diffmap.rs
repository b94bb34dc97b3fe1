//! The `diffmap` module provides [`DiffMap`], the byte-indexed buffer of [`Verdict`]s
//! shared by both views of a comparison.
//!
//! The map is sized to the longer of the two sources and allocated up front. Its entries
//! are written only by [`crate::engine`]; renderers get read access through [`DiffMap::get`]
//! and [`DiffMap::verdicts`]. An entry that no window has covered yet reads as `None`.

use crate::error::BinDiffError;
use std::ops::Range;

/// Classification of one byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Verdict {
    /// Both sources hold the same byte
    Match = 1,
    /// Both sources hold a byte, but they differ
    Mismatch = 2,
    /// Only the longer source holds a byte at this offset
    OutOfRange = 3,
}

impl Verdict {
    /// Value stored for offsets that were never part of a computed window
    const UNSET: u8 = 0;

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Match),
            2 => Some(Self::Mismatch),
            3 => Some(Self::OutOfRange),
            _ => None,
        }
    }

    /// `true` for every verdict a renderer highlights as a difference
    #[must_use]
    pub const fn is_difference(self) -> bool {
        !matches!(self, Self::Match)
    }
}

#[derive(Debug, Clone)]
pub struct DiffMap {
    /// One verdict code per byte offset
    cells: Vec<u8>,
    /// Offset range written by the latest recompute
    last_window: Option<Range<u64>>,
}

impl DiffMap {
    /// Allocate a map covering `len` byte offsets, all unset.
    ///
    /// # Errors
    /// Returns [`BinDiffError::AllocationFailure`] if the buffer cannot be reserved.
    pub fn allocate(len: u64) -> Result<Self, BinDiffError> {
        let failure = || BinDiffError::AllocationFailure { bytes: len };

        let size = usize::try_from(len).map_err(|_| failure())?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(size).map_err(|_| failure())?;
        cells.resize(size, Verdict::UNSET);

        log::debug!("Allocated diff map of {len} bytes");

        Ok(Self {
            cells,
            last_window: None,
        })
    }

    /// Number of byte offsets covered by the map
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.cells.len() as u64
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Verdict at `offset`, or `None` if it is outside the map or not computed yet
    #[must_use]
    pub fn get(&self, offset: u64) -> Option<Verdict> {
        let index = usize::try_from(offset).ok()?;
        self.cells.get(index).copied().and_then(Verdict::from_code)
    }

    /// Verdicts of a range of offsets, clipped to the map
    pub fn verdicts(&self, range: Range<u64>) -> impl Iterator<Item = Option<Verdict>> + '_ {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        // Both bounds are within `cells`, so they fit into usize
        let (start, end) = (
            usize::try_from(start).unwrap_or_default(),
            usize::try_from(end).unwrap_or_default(),
        );
        self.cells[start..end]
            .iter()
            .map(|&code| Verdict::from_code(code))
    }

    /// Offset range written by the latest recompute, if any
    #[must_use]
    pub fn last_window(&self) -> Option<Range<u64>> {
        self.last_window.clone()
    }

    /// First computed difference at or after `from`
    #[must_use]
    pub fn next_difference(&self, from: u64) -> Option<u64> {
        let start = usize::try_from(from).ok()?;
        self.cells
            .get(start..)?
            .iter()
            .position(|&code| Verdict::from_code(code).is_some_and(Verdict::is_difference))
            .map(|pos| from + pos as u64)
    }

    /// Last computed difference strictly before `before`
    #[must_use]
    pub fn prev_difference(&self, before: u64) -> Option<u64> {
        let end = usize::try_from(before.min(self.len())).ok()?;
        self.cells[..end]
            .iter()
            .rposition(|&code| Verdict::from_code(code).is_some_and(Verdict::is_difference))
            .map(|pos| pos as u64)
    }

    /// Store a verdict. Offsets outside the map are ignored.
    pub(crate) fn set(&mut self, offset: u64, verdict: Verdict) {
        if let Ok(index) = usize::try_from(offset)
            && let Some(cell) = self.cells.get_mut(index)
        {
            *cell = verdict as u8;
        }
    }

    pub(crate) fn set_last_window(&mut self, window: Range<u64>) {
        self.last_window = Some(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_unset() {
        // Act
        let map = DiffMap::allocate(16);

        // Assert
        let Ok(map) = map else {
            panic!("allocation of a tiny map failed");
        };
        assert_eq!(map.len(), 16);
        assert!(map.verdicts(0..16).all(|v| v.is_none()));
        assert!(map.last_window().is_none());
    }

    #[test]
    fn test_allocate_too_large() {
        // Act
        let res = DiffMap::allocate(u64::MAX);

        // Assert
        assert!(matches!(
            res,
            Err(BinDiffError::AllocationFailure { bytes: u64::MAX })
        ));
    }

    #[test]
    fn test_set_and_get() {
        // Arrange
        let Ok(mut map) = DiffMap::allocate(4) else {
            panic!("allocation of a tiny map failed");
        };

        // Act
        map.set(1, Verdict::Mismatch);
        map.set(3, Verdict::OutOfRange);
        map.set(100, Verdict::Mismatch);

        // Assert
        assert_eq!(map.get(0), None);
        assert_eq!(map.get(1), Some(Verdict::Mismatch));
        assert_eq!(map.get(3), Some(Verdict::OutOfRange));
        assert_eq!(map.get(100), None);
    }

    #[test]
    fn test_verdicts_clipped() {
        // Arrange
        let Ok(mut map) = DiffMap::allocate(4) else {
            panic!("allocation of a tiny map failed");
        };
        map.set(3, Verdict::Match);

        // Act
        let verdicts: Vec<_> = map.verdicts(2..10).collect();

        // Assert
        assert_eq!(verdicts, vec![None, Some(Verdict::Match)]);
        assert_eq!(map.verdicts(8..12).count(), 0);
    }

    #[test]
    fn test_next_and_prev_difference() {
        // Arrange
        let Ok(mut map) = DiffMap::allocate(10) else {
            panic!("allocation of a tiny map failed");
        };
        map.set(2, Verdict::Mismatch);
        map.set(3, Verdict::Match);
        map.set(7, Verdict::OutOfRange);

        // Act & Assert
        assert_eq!(map.next_difference(0), Some(2));
        assert_eq!(map.next_difference(3), Some(7));
        assert_eq!(map.next_difference(8), None);
        assert_eq!(map.prev_difference(7), Some(2));
        assert_eq!(map.prev_difference(100), Some(7));
        assert_eq!(map.prev_difference(2), None);
    }
}
