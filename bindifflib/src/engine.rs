//! The `engine` module computes byte verdicts for the offsets that can currently be
//! seen in either view.
//!
//! Re-diffing a multi-gigabyte file on every scroll tick is wasted work, so a recompute
//! only covers the *diff window*: the union of both views' visible byte ranges. If the two
//! views have scrolled so far apart that their screens do not overlap, the dead zone in
//! between is skipped and the window starts at the farther view.
//!
//! The window is bounded by the screen capacity, so [`recompute_window`] is O(window size)
//! no matter how large the sources are.

use crate::diffmap::{DiffMap, Verdict};
use crate::error::BinDiffError;
use crate::source::ByteSource;
use crate::viewport::ViewportState;
use std::ops::Range;

/// Bytes compared per bulk read
const CHUNK_SIZE: usize = 64 * 1024;

/// Offsets a recompute has to cover, given the first visible byte of each view and the
/// number of bytes one screen shows.
///
/// # Example
/// ```
/// use bindifflib::engine::diff_window;
///
/// // Overlapping screens: one window covering both
/// assert_eq!(diff_window(0, 2, 4), 0..6);
/// // Screens far apart: the gap between them is skipped
/// assert_eq!(diff_window(100, 0, 4), 100..104);
/// ```
#[must_use]
pub fn diff_window(addend_a: u64, addend_b: u64, capacity: u64) -> Range<u64> {
    let lo = addend_a.min(addend_b);
    let hi = addend_a.max(addend_b);

    let begin = if hi - lo > capacity { hi } else { lo };
    begin..hi.saturating_add(capacity)
}

/// Verdict for a single offset, or `None` if the offset is outside both sources
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
pub fn classify<A, B>(a: &A, b: &B, offset: u64) -> Result<Option<Verdict>, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    if offset < common {
        let verdict = if a.byte_at(offset)? == b.byte_at(offset)? {
            Verdict::Match
        } else {
            Verdict::Mismatch
        };
        Ok(Some(verdict))
    } else if offset < longest {
        Ok(Some(Verdict::OutOfRange))
    } else {
        Ok(None)
    }
}

/// Write verdicts for every offset of `window` into `map`.
///
/// Offsets beyond both sources (or beyond the map) are left untouched. Returns the
/// range that was actually written.
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources. Verdicts written
/// before the failing chunk stay in the map; they are correct regardless.
pub fn diff_range<A, B>(
    a: &A,
    b: &B,
    window: Range<u64>,
    map: &mut DiffMap,
) -> Result<Range<u64>, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    let end = window.end.min(longest).min(map.len());
    let begin = window.start.min(end);

    // Offsets present in both sources
    let mut offset = begin;
    let compare_end = end.min(common);
    while offset < compare_end {
        let count = usize::try_from(compare_end - offset)
            .unwrap_or(CHUNK_SIZE)
            .min(CHUNK_SIZE);
        let chunk_a = a.read(offset, count)?;
        let chunk_b = b.read(offset, count)?;

        for (i, (x, y)) in chunk_a.iter().zip(chunk_b).enumerate() {
            let verdict = if x == y {
                Verdict::Match
            } else {
                Verdict::Mismatch
            };
            map.set(offset + i as u64, verdict);
        }
        offset += count as u64;
    }

    // Offsets present only in the longer source
    for c in begin.max(common)..end {
        map.set(c, Verdict::OutOfRange);
    }

    Ok(begin..end)
}

/// Recompute the diff window for the current scroll positions of both views.
///
/// Both views are expected to be at layout parity (same bytes per line and same
/// visible line count). The larger of the two capacities is used, so a view that is a
/// line taller than the other is still fully covered.
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
pub fn recompute_window<A, B>(
    a: &A,
    b: &B,
    view_a: &ViewportState,
    view_b: &ViewportState,
    map: &mut DiffMap,
) -> Result<Range<u64>, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let capacity = view_a.capacity().max(view_b.capacity());
    let window = diff_window(
        view_a.scroll_offset_bytes(),
        view_b.scroll_offset_bytes(),
        capacity,
    );

    let written = diff_range(a, b, window, map)?;
    log::debug!("Diff window recomputed: {written:?}");

    map.set_last_window(written.clone());
    Ok(written)
}

/// First offset at or after `from` that is not a match, scanning the sources directly.
///
/// Unlike [`DiffMap::next_difference`] this also finds differences that were never on
/// screen. The scan is linear in the distance to the result.
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
pub fn find_next_difference<A, B>(a: &A, b: &B, from: u64) -> Result<Option<u64>, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    let mut offset = from;
    while offset < common {
        let count = usize::try_from(common - offset)
            .unwrap_or(CHUNK_SIZE)
            .min(CHUNK_SIZE);
        let chunk_a = a.read(offset, count)?;
        let chunk_b = b.read(offset, count)?;

        if let Some(i) = chunk_a.iter().zip(chunk_b).position(|(x, y)| x != y) {
            return Ok(Some(offset + i as u64));
        }
        offset += count as u64;
    }

    // Past the common part every offset is out of range
    let offset = offset.max(common);
    Ok((offset < longest).then_some(offset))
}

/// Last offset strictly before `before` that is not a match, scanning the sources
/// directly.
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
pub fn find_prev_difference<A, B>(a: &A, b: &B, before: u64) -> Result<Option<u64>, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    let mut end = before.min(longest);
    if end > common {
        return Ok(Some(end - 1));
    }

    while end > 0 {
        let start = end.saturating_sub(CHUNK_SIZE as u64);
        let count = usize::try_from(end - start).unwrap_or(CHUNK_SIZE);
        let chunk_a = a.read(start, count)?;
        let chunk_b = b.read(start, count)?;

        if let Some(i) = chunk_a.iter().zip(chunk_b).rposition(|(x, y)| x != y) {
            return Ok(Some(start + i as u64));
        }
        end = start;
    }

    Ok(None)
}

/// Totals of a whole-file comparison
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    /// Length of the first source
    pub len_a: u64,
    /// Length of the second source
    pub len_b: u64,
    /// Offsets where both sources hold different bytes
    pub mismatches: u64,
    /// Offsets present only in the longer source
    pub out_of_range: u64,
    /// First offset that is not a match
    pub first_difference: Option<u64>,
}

impl DiffSummary {
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.mismatches == 0 && self.out_of_range == 0
    }
}

/// Compare two sources from start to end.
///
/// This walks the whole pair and is meant for headless use. Interactive views only
/// ever go through [`recompute_window`].
///
/// # Errors
/// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
pub fn summarize<A, B>(a: &A, b: &B) -> Result<DiffSummary, BinDiffError>
where
    A: ByteSource + ?Sized,
    B: ByteSource + ?Sized,
{
    let common = a.len().min(b.len());
    let longest = a.len().max(b.len());

    let mut summary = DiffSummary {
        len_a: a.len(),
        len_b: b.len(),
        out_of_range: longest - common,
        ..DiffSummary::default()
    };

    let mut offset = 0;
    while offset < common {
        let count = usize::try_from(common - offset)
            .unwrap_or(CHUNK_SIZE)
            .min(CHUNK_SIZE);
        let chunk_a = a.read(offset, count)?;
        let chunk_b = b.read(offset, count)?;

        for (i, (x, y)) in chunk_a.iter().zip(chunk_b).enumerate() {
            if x != y {
                summary.mismatches += 1;
                summary.first_difference.get_or_insert(offset + i as u64);
            }
        }
        offset += count as u64;
    }

    if summary.first_difference.is_none() && longest > common {
        summary.first_difference = Some(common);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn map_of(len: u64) -> DiffMap {
        let Ok(map) = DiffMap::allocate(len) else {
            panic!("allocation of a small map failed");
        };
        map
    }

    #[test]
    fn test_diff_window_overlapping() {
        // Act & Assert
        assert_eq!(diff_window(0, 0, 4), 0..4);
        assert_eq!(diff_window(8, 4, 4), 4..12);
        assert_eq!(diff_window(4, 8, 4), 4..12);
    }

    #[test]
    fn test_diff_window_far_apart() {
        // Act & Assert
        assert_eq!(diff_window(100, 0, 4), 100..104);
        assert_eq!(diff_window(0, 100, 4), 100..104);
        // Exactly one capacity apart still counts as overlapping
        assert_eq!(diff_window(0, 4, 4), 0..8);
    }

    #[test]
    fn test_diff_range_scenario() {
        // Arrange
        let a = MemorySource::from(vec![0x00, 0x01, 0x02, 0xFF]);
        let b = MemorySource::from(vec![0x00, 0x01, 0x03]);
        let mut map = map_of(4);

        // Act
        let written = diff_range(&a, &b, 0..4, &mut map);

        // Assert
        assert_eq!(written.ok(), Some(0..4));
        assert_eq!(
            map.verdicts(0..4).collect::<Vec<_>>(),
            vec![
                Some(Verdict::Match),
                Some(Verdict::Match),
                Some(Verdict::Mismatch),
                Some(Verdict::OutOfRange)
            ]
        );
    }

    #[test]
    fn test_diff_range_beyond_both_sources_not_written() {
        // Arrange
        let a = MemorySource::from(vec![1, 2]);
        let b = MemorySource::from(vec![1, 2, 3]);
        let mut map = map_of(3);

        // Act
        let written = diff_range(&a, &b, 1..50, &mut map);

        // Assert
        assert_eq!(written.ok(), Some(1..3));
        assert_eq!(map.get(0), None);
        assert_eq!(map.get(1), Some(Verdict::Match));
        assert_eq!(map.get(2), Some(Verdict::OutOfRange));
    }

    #[test]
    fn test_diff_range_large_window_spans_chunks() {
        // Arrange
        let len = CHUNK_SIZE * 2 + 10;
        let a = MemorySource::from(vec![0xAA; len]);
        let mut data_b = vec![0xAA; len];
        data_b[CHUNK_SIZE + 1] = 0xBB;
        let b = MemorySource::from(data_b);
        let mut map = map_of(len as u64);

        // Act
        let res = diff_range(&a, &b, 0..len as u64, &mut map);

        // Assert
        assert!(res.is_ok());
        assert_eq!(map.next_difference(0), Some(CHUNK_SIZE as u64 + 1));
        assert_eq!(map.next_difference(CHUNK_SIZE as u64 + 2), None);
    }

    #[test]
    fn test_classify() {
        // Arrange
        let a = MemorySource::from(vec![0x00, 0x01, 0x02, 0xFF]);
        let b = MemorySource::from(vec![0x00, 0x01, 0x03]);

        // Act & Assert
        assert_eq!(classify(&a, &b, 1).ok(), Some(Some(Verdict::Match)));
        assert_eq!(classify(&a, &b, 2).ok(), Some(Some(Verdict::Mismatch)));
        assert_eq!(classify(&a, &b, 3).ok(), Some(Some(Verdict::OutOfRange)));
        assert_eq!(classify(&a, &b, 4).ok(), Some(None));
    }

    #[test]
    fn test_find_next_difference() {
        // Arrange
        let mut data_a = vec![0x11; CHUNK_SIZE + 100];
        data_a[CHUNK_SIZE + 10] = 0x22;
        let a = MemorySource::from(data_a);
        let b = MemorySource::from(vec![0x11; CHUNK_SIZE + 50]);

        // Act & Assert
        let next = |from| find_next_difference(&a, &b, from).ok().flatten();
        assert_eq!(next(0), Some(CHUNK_SIZE as u64 + 10));
        assert_eq!(next(CHUNK_SIZE as u64 + 11), Some(CHUNK_SIZE as u64 + 50));
        assert_eq!(next(CHUNK_SIZE as u64 + 70), Some(CHUNK_SIZE as u64 + 70));
        assert_eq!(next(CHUNK_SIZE as u64 + 100), None);
    }

    #[test]
    fn test_find_prev_difference() {
        // Arrange
        let mut data_a = vec![0x11; CHUNK_SIZE * 2];
        data_a[5] = 0x22;
        let a = MemorySource::from(data_a);
        let b = MemorySource::from(vec![0x11; CHUNK_SIZE * 2 - 8]);

        // Act & Assert
        let prev = |before| find_prev_difference(&a, &b, before).ok().flatten();
        assert_eq!(prev(u64::MAX), Some(CHUNK_SIZE as u64 * 2 - 1));
        assert_eq!(prev(CHUNK_SIZE as u64 * 2 - 8), Some(5));
        assert_eq!(prev(5), None);
    }

    #[test]
    fn test_find_difference_in_identical_sources() {
        // Arrange
        let a = MemorySource::from(vec![3; 300]);
        let b = MemorySource::from(vec![3; 300]);

        // Act & Assert
        assert_eq!(find_next_difference(&a, &b, 0).ok(), Some(None));
        assert_eq!(find_prev_difference(&a, &b, 300).ok(), Some(None));
    }

    #[test]
    fn test_summarize() {
        // Arrange
        let a = MemorySource::from(vec![0x00, 0x01, 0x02, 0xFF]);
        let b = MemorySource::from(vec![0x00, 0x01, 0x03]);

        // Act
        let summary = summarize(&a, &b);

        // Assert
        assert_eq!(
            summary.ok(),
            Some(DiffSummary {
                len_a: 4,
                len_b: 3,
                mismatches: 1,
                out_of_range: 1,
                first_difference: Some(2),
            })
        );
    }

    #[test]
    fn test_summarize_prefix() {
        // Arrange
        let a = MemorySource::from(vec![7; 10]);
        let b = MemorySource::from(vec![7; 15]);

        // Act
        let Ok(summary) = summarize(&a, &b) else {
            panic!("summarize failed");
        };

        // Assert
        assert!(!summary.is_identical());
        assert_eq!(summary.mismatches, 0);
        assert_eq!(summary.out_of_range, 5);
        assert_eq!(summary.first_difference, Some(10));
    }
}
