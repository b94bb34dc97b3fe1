//! The `viewport` module provides [`ViewportState`], the per-view scroll and layout state.
//!
//! A viewport knows the length of its source, the pixel size it is given, and the glyph
//! size it is drawn with. From those it derives the number of bytes per line (through
//! [`crate::layout::fit`]), the number of lines that fit on screen, and the valid range
//! of the scroll offset.
//!
//! Mutating operations return a [`ViewUpdate`] that tells the owner what changed, so it can
//! bring the linked view to layout parity and recompute the diff window.

use crate::layout::{self, BYTES_PER_GROUP, GlyphMetrics, LayoutMetrics, MIN_BYTE_GROUPS};
use std::ops::Range;

/// Address digits used for sources addressable with a 32-bit signed offset
pub const DEFAULT_ADDRESS_DIGITS: usize = 8;
/// Address digits used once a source exceeds the 32-bit signed range
pub const WIDE_ADDRESS_DIGITS: usize = 16;
/// A 64-bit address has 16 nibbles
const MAX_ADDRESS_DIGITS: usize = 16;
/// Largest source length that still uses [`DEFAULT_ADDRESS_DIGITS`]
const NARROW_ADDRESS_LIMIT: u64 = i32::MAX as u64;

/// Notification returned by every mutating [`ViewportState`] operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ViewUpdate {
    /// Visible bytes moved (scroll, resize, new source)
    pub content_changed: bool,
    /// Address digits or byte groups changed, linked views have to follow
    pub visuals_changed: bool,
}

impl ViewUpdate {
    pub const NONE: Self = Self {
        content_changed: false,
        visuals_changed: false,
    };

    pub const CONTENT: Self = Self {
        content_changed: true,
        visuals_changed: false,
    };

    /// Combine two notifications
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            content_changed: self.content_changed || other.content_changed,
            visuals_changed: self.visuals_changed || other.visuals_changed,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.content_changed && !self.visuals_changed
    }
}

/// Scroll position and line layout of one view
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Number of hex digits in the address column (always even)
    address_digits: usize,
    /// Mask of the lower half of the address digits
    lower_mask: u64,
    /// Mask of the upper half of the address digits
    upper_mask: u64,
    /// Number of byte groups on one line
    byte_groups: usize,
    /// Length of the viewed source in bytes
    source_len: u64,
    /// Number of lines needed to show the whole source
    line_count: u64,
    /// Index of the first visible line
    scroll_line: u64,
    /// Number of whole lines that fit on screen
    visible_lines: u64,
    /// Pixels the line is shifted left when it is wider than the view
    horizontal_offset: f32,
    /// Last known pixel size of the view
    width: f32,
    height: f32,
    glyph: GlyphMetrics,
    metrics: LayoutMetrics,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(GlyphMetrics::default())
    }
}

impl ViewportState {
    /// Create an empty view drawn with the given glyph size
    #[must_use]
    pub fn new(glyph: GlyphMetrics) -> Self {
        let mut view = Self {
            address_digits: 0,
            lower_mask: 0,
            upper_mask: 0,
            byte_groups: MIN_BYTE_GROUPS,
            source_len: 0,
            line_count: 0,
            scroll_line: 0,
            visible_lines: 0,
            horizontal_offset: 0.0,
            width: 0.0,
            height: 0.0,
            glyph,
            metrics: LayoutMetrics::compute(glyph, DEFAULT_ADDRESS_DIGITS, MIN_BYTE_GROUPS),
        };
        view.apply_address_digits(DEFAULT_ADDRESS_DIGITS);
        view
    }

    // -- Accessors

    #[must_use]
    pub const fn address_digits(&self) -> usize {
        self.address_digits
    }

    #[must_use]
    pub const fn lower_mask(&self) -> u64 {
        self.lower_mask
    }

    #[must_use]
    pub const fn upper_mask(&self) -> u64 {
        self.upper_mask
    }

    #[must_use]
    pub const fn byte_groups(&self) -> usize {
        self.byte_groups
    }

    #[must_use]
    pub const fn bytes_per_line(&self) -> usize {
        self.byte_groups * BYTES_PER_GROUP
    }

    #[must_use]
    pub const fn source_len(&self) -> u64 {
        self.source_len
    }

    #[must_use]
    pub const fn line_count(&self) -> u64 {
        self.line_count
    }

    #[must_use]
    pub const fn scroll_line(&self) -> u64 {
        self.scroll_line
    }

    #[must_use]
    pub const fn visible_line_count(&self) -> u64 {
        self.visible_lines
    }

    #[must_use]
    pub const fn glyph(&self) -> GlyphMetrics {
        self.glyph
    }

    #[must_use]
    pub const fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// First visible byte offset. Always a multiple of the bytes per line.
    #[must_use]
    pub const fn scroll_offset_bytes(&self) -> u64 {
        self.scroll_line * self.bytes_per_line() as u64
    }

    #[must_use]
    pub const fn horizontal_offset(&self) -> f32 {
        self.horizontal_offset
    }

    /// Largest horizontal offset, non-zero only while the minimum line is wider than
    /// the view
    #[must_use]
    pub fn max_horizontal_offset(&self) -> f32 {
        (self.metrics.line_width() - self.width).max(0.0)
    }

    /// Number of bytes a full screen can show
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.visible_lines * self.bytes_per_line() as u64
    }

    /// Largest valid scroll line
    #[must_use]
    pub const fn max_scroll_line(&self) -> u64 {
        self.line_count.saturating_sub(self.visible_lines)
    }

    /// Line indices currently on screen
    #[must_use]
    pub fn visible_lines(&self) -> Range<u64> {
        let end = self.scroll_line.saturating_add(self.visible_lines);
        self.scroll_line..end.min(self.line_count)
    }

    /// Byte offsets shown on the given line, clipped to the source length
    #[must_use]
    pub fn line_bytes(&self, line: u64) -> Range<u64> {
        let bpl = self.bytes_per_line() as u64;
        let start = line.saturating_mul(bpl).min(self.source_len);
        let end = start.saturating_add(bpl).min(self.source_len);
        start..end
    }

    /// Render an address as `UPPER:LOWER`, each half `address_digits / 2` hex digits
    #[must_use]
    pub fn format_address(&self, addr: u64) -> String {
        let half = self.address_digits / 2;
        let upper = (addr & self.upper_mask) >> (4 * half);
        let lower = addr & self.lower_mask;
        format!("{upper:0half$X}:{lower:0half$X}")
    }

    // -- Mutations

    /// Set the number of address digits.
    ///
    /// Odd counts are rounded up to the next even number. The count is kept within
    /// `2..=16`, the range a 64-bit address can be split into.
    pub fn set_address_digits(&mut self, digits: usize) -> ViewUpdate {
        let old_digits = self.address_digits;
        self.apply_address_digits(digits);

        if self.address_digits == old_digits {
            return ViewUpdate::NONE;
        }

        let update = self.relayout();
        ViewUpdate {
            visuals_changed: true,
            ..update
        }
    }

    /// Publish the length of a newly loaded source.
    ///
    /// Escalates the address to [`WIDE_ADDRESS_DIGITS`] digits when the source exceeds
    /// the 32-bit signed range. Digits never shrink back within a session.
    pub fn set_source_length(&mut self, len: u64) -> ViewUpdate {
        self.source_len = len;

        let wanted = if len > NARROW_ADDRESS_LIMIT {
            WIDE_ADDRESS_DIGITS
        } else {
            DEFAULT_ADDRESS_DIGITS
        };

        let mut update = ViewUpdate::CONTENT;
        if wanted > self.address_digits {
            log::debug!(
                "Address escalated from {} to {wanted} digits",
                self.address_digits
            );
            update = update.merge(self.set_address_digits(wanted));
        }

        self.update_line_count();
        update
    }

    /// Give the view a new pixel size and re-fit the line layout
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize(&mut self, width: f32, height: f32) -> ViewUpdate {
        self.width = width;
        self.height = height;
        self.visible_lines = if self.glyph.is_valid() && height.is_finite() {
            ((height - self.metrics.margin).max(0.0) / self.glyph.height).floor() as u64
        } else {
            0
        };

        let update = self.relayout();
        self.clamp_scroll();
        ViewUpdate::CONTENT.merge(update)
    }

    /// Swap the glyph size (font change) and re-fit at the last known size
    pub fn set_glyph_metrics(&mut self, glyph: GlyphMetrics) -> ViewUpdate {
        if self.glyph == glyph {
            return ViewUpdate::NONE;
        }
        self.glyph = glyph;
        self.metrics = LayoutMetrics::compute(glyph, self.address_digits, self.byte_groups);
        self.resize(self.width, self.height)
    }

    /// Bring this view to layout parity with `other`.
    ///
    /// Copies the number of byte groups and follows an address escalation. Address digits
    /// are only ever copied upwards.
    pub fn synchronize_with(&mut self, other: &Self) -> ViewUpdate {
        let mut update = ViewUpdate::NONE;

        if other.address_digits > self.address_digits {
            self.apply_address_digits(other.address_digits);
            update.visuals_changed = true;
        }

        if other.byte_groups != self.byte_groups {
            self.apply_byte_groups(other.byte_groups);
            update = update.merge(ViewUpdate::CONTENT);
            update.visuals_changed = true;
        }

        self.metrics = LayoutMetrics::compute(self.glyph, self.address_digits, self.byte_groups);
        self.clamp_scroll();
        update
    }

    /// Scroll so that `line` is the first visible line (clamped)
    pub fn scroll_to(&mut self, line: u64) -> ViewUpdate {
        let line = line.min(self.max_scroll_line());
        if line == self.scroll_line {
            return ViewUpdate::NONE;
        }
        self.scroll_line = line;
        ViewUpdate::CONTENT
    }

    /// Scroll by a number of lines, negative values scroll up
    pub fn scroll_by(&mut self, delta_lines: i64) -> ViewUpdate {
        self.scroll_to(self.scroll_line.saturating_add_signed(delta_lines))
    }

    /// Scroll by whole screens, negative values scroll up
    #[allow(clippy::cast_possible_wrap)]
    pub fn scroll_page(&mut self, delta_pages: i64) -> ViewUpdate {
        let page = self.visible_lines.max(1) as i64;
        self.scroll_by(delta_pages.saturating_mul(page))
    }

    /// Shift the line left by `offset` pixels (clamped).
    /// Returns `true` if the offset changed. The visible bytes stay the same.
    pub fn scroll_horizontal_to(&mut self, offset: f32) -> bool {
        let offset = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.max_horizontal_offset())
        };
        if (offset - self.horizontal_offset).abs() < f32::EPSILON {
            return false;
        }
        self.horizontal_offset = offset;
        true
    }

    /// Scroll so that the line containing `offset` is the first visible line
    pub fn scroll_to_offset(&mut self, offset: u64) -> ViewUpdate {
        self.scroll_to(offset / self.bytes_per_line() as u64)
    }

    // -- Internals

    fn apply_address_digits(&mut self, digits: usize) {
        let digits = digits.saturating_add(digits & 1).clamp(2, MAX_ADDRESS_DIGITS);
        let half = digits / 2;

        self.address_digits = digits;
        self.lower_mask = (1u64 << (4 * half)) - 1;
        self.upper_mask = self.lower_mask << (4 * half);
    }

    /// Change the number of byte groups, keeping the first visible byte on screen
    fn apply_byte_groups(&mut self, groups: usize) {
        let first_visible = self.scroll_offset_bytes();
        self.byte_groups = groups.max(MIN_BYTE_GROUPS);
        self.update_line_count();
        self.scroll_line = (first_visible / self.bytes_per_line() as u64).min(self.max_scroll_line());
    }

    /// Re-run the fit at the last known width
    fn relayout(&mut self) -> ViewUpdate {
        let (groups, metrics) = layout::fit(
            self.width,
            self.glyph,
            self.address_digits,
            self.byte_groups,
        );
        self.metrics = metrics;

        if groups == self.byte_groups {
            return ViewUpdate::NONE;
        }

        log::debug!("Byte groups per line: {} -> {groups}", self.byte_groups);
        self.apply_byte_groups(groups);
        ViewUpdate {
            content_changed: true,
            visuals_changed: true,
        }
    }

    fn update_line_count(&mut self) {
        self.line_count = self.source_len.div_ceil(self.bytes_per_line() as u64);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_line = self.scroll_line.min(self.max_scroll_line());
        self.horizontal_offset = self.horizontal_offset.min(self.max_horizontal_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYPH: GlyphMetrics = GlyphMetrics::new(8.0, 16.0);

    fn view_with(len: u64, width: f32, height: f32) -> ViewportState {
        let mut view = ViewportState::new(GLYPH);
        let _ = view.set_source_length(len);
        let _ = view.resize(width, height);
        view
    }

    #[test]
    fn test_address_digits_rounded_up_to_even() {
        // Arrange
        let mut view = ViewportState::new(GLYPH);

        // Act & Assert
        let _ = view.set_address_digits(5);
        assert_eq!(view.address_digits(), 6);
        let _ = view.set_address_digits(0);
        assert_eq!(view.address_digits(), 2);
        let _ = view.set_address_digits(12);
        assert_eq!(view.address_digits(), 12);
    }

    #[test]
    fn test_address_masks() {
        // Arrange
        let mut view = ViewportState::new(GLYPH);

        // Act & Assert
        assert_eq!(view.lower_mask(), 0x0000_FFFF);
        assert_eq!(view.upper_mask(), 0xFFFF_0000);

        let _ = view.set_address_digits(16);
        assert_eq!(view.lower_mask(), 0x0000_0000_FFFF_FFFF);
        assert_eq!(view.upper_mask(), 0xFFFF_FFFF_0000_0000);
    }

    #[test]
    fn test_format_address() {
        // Arrange
        let mut view = ViewportState::new(GLYPH);

        // Act & Assert
        assert_eq!(view.format_address(0x1234_ABCD), "1234:ABCD");
        let _ = view.set_address_digits(16);
        assert_eq!(view.format_address(0x1_0000_00FF), "00000001:000000FF");
    }

    #[test]
    fn test_source_length_escalates_address() {
        // Arrange
        let mut view = ViewportState::new(GLYPH);

        // Act
        let small = view.set_source_length(1024);
        let large = view.set_source_length(u64::from(u32::MAX));
        let small_again = view.set_source_length(16);

        // Assert
        assert!(!small.visuals_changed);
        assert!(large.visuals_changed);
        assert!(!small_again.visuals_changed);
        // Never de-escalates
        assert_eq!(view.address_digits(), WIDE_ADDRESS_DIGITS);
    }

    #[test]
    fn test_line_count_rounds_up() {
        // Arrange
        let mut view = ViewportState::new(GLYPH);

        // Act
        let _ = view.set_source_length(17);

        // Assert
        assert_eq!(view.bytes_per_line(), 8);
        assert_eq!(view.line_count(), 3);
        assert_eq!(view.line_bytes(2), 16..17);
    }

    #[test]
    fn test_resize_sets_visible_lines_and_groups() {
        // Act
        let view = view_with(4096, 600.0, 164.0);

        // Assert
        assert_eq!(view.byte_groups(), 4);
        assert_eq!(view.bytes_per_line(), 16);
        assert_eq!(view.visible_line_count(), 10);
        assert_eq!(view.capacity(), 160);
    }

    #[test]
    fn test_resize_to_zero_width() {
        // Arrange
        let mut view = view_with(4096, 1200.0, 400.0);

        // Act
        let update = view.resize(0.0, 400.0);

        // Assert
        assert!(update.visuals_changed);
        assert_eq!(view.byte_groups(), MIN_BYTE_GROUPS);
    }

    #[test]
    fn test_scroll_clamped() {
        // Arrange
        let mut view = view_with(4096, 600.0, 164.0);

        // Act & Assert
        let _ = view.scroll_by(-5);
        assert_eq!(view.scroll_line(), 0);

        let _ = view.scroll_to(u64::MAX);
        assert_eq!(view.scroll_line(), 256 - 10);
        assert_eq!(view.scroll_offset_bytes(), 246 * 16);

        let _ = view.scroll_page(-1);
        assert_eq!(view.scroll_line(), 236);
    }

    #[test]
    fn test_scroll_noop_reports_nothing() {
        // Arrange
        let mut view = view_with(4096, 600.0, 164.0);

        // Act
        let update = view.scroll_to(0);

        // Assert
        assert!(update.is_empty());
    }

    #[test]
    fn test_first_visible_byte_kept_on_relayout() {
        // Arrange
        let mut view = view_with(4096, 600.0, 164.0);
        let _ = view.scroll_to_offset(800);
        assert_eq!(view.scroll_offset_bytes(), 800);

        // Act: 2 groups -> 8 bytes per line
        let _ = view.resize(300.0, 164.0);

        // Assert
        assert_eq!(view.bytes_per_line(), 8);
        assert_eq!(view.scroll_offset_bytes(), 800);
    }

    #[test]
    fn test_synchronize_with() {
        // Arrange
        let mut wide = view_with(u64::from(u32::MAX), 900.0, 164.0);
        let mut narrow = view_with(64, 600.0, 164.0);
        let _ = wide.resize(900.0, 164.0);

        // Act
        let update = narrow.synchronize_with(&wide);

        // Assert
        assert!(update.visuals_changed);
        assert_eq!(narrow.address_digits(), WIDE_ADDRESS_DIGITS);
        assert_eq!(narrow.byte_groups(), wide.byte_groups());
        assert_eq!(narrow.capacity(), wide.capacity());
    }

    #[test]
    fn test_set_glyph_metrics_refits() {
        // Arrange
        let mut view = view_with(4096, 600.0, 164.0);

        // Act
        let update = view.set_glyph_metrics(GlyphMetrics::new(4.0, 8.0));

        // Assert
        assert!(update.visuals_changed);
        assert!(view.byte_groups() > 4);
        assert_eq!(view.visible_line_count(), 20);
    }

    #[test]
    fn test_horizontal_scroll_only_when_line_overflows() {
        // Arrange: two groups need 324 px
        let mut view = view_with(4096, 100.0, 164.0);

        // Act
        let moved = view.scroll_horizontal_to(500.0);
        let clamped = view.horizontal_offset();
        let _ = view.resize(600.0, 164.0);

        // Assert
        assert!(moved);
        assert!((clamped - 224.0).abs() < f32::EPSILON);
        assert!(view.max_horizontal_offset().abs() < f32::EPSILON);
        assert!(view.horizontal_offset().abs() < f32::EPSILON);
        assert!(!view.scroll_horizontal_to(10.0));
    }
}
