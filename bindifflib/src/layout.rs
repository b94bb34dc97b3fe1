//! The `layout` module fits a line of the hex view into an available pixel width.
//!
//! A line consists of three columns: the address, the hex bytes (split into groups of
//! [`BYTES_PER_GROUP`] bytes with a gap between groups), and the ASCII representation.
//! All widths are derived from the fixed-pitch glyph size, so [`LayoutMetrics`] can be
//! recomputed at any time from its inputs alone.
//!
//! [`fit`] searches for the number of byte groups per line instead of solving for it:
//! starting from the current count it steps up or down until the line just fits.
//! Since a resize rarely changes the count by more than one or two groups, the search
//! usually ends after a couple of iterations.

/// Number of bytes in one visual group of the hex column
pub const BYTES_PER_GROUP: usize = 4;
/// Lines never get narrower than this many groups
pub const MIN_BYTE_GROUPS: usize = 2;
/// Upper bound of the search, keeps absurd widths from stalling the fit
pub const MAX_BYTE_GROUPS: usize = 1024;

/// Size of one glyph of a fixed-pitch font, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
}

impl GlyphMetrics {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Glyph metrics are usable only if both dimensions are positive and finite
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

/// Pixel geometry of one line of the hex view
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutMetrics {
    /// Width of the address column, including the ':' separator and margins
    pub address_column_width: f32,
    /// Width of the hex column
    pub hex_column_width: f32,
    /// Width of the ASCII column
    pub ascii_column_width: f32,
    /// Horizontal advance of one hex byte ("XX" plus a margin)
    pub byte_cell_width: f32,
    /// Extra space between two byte groups
    pub group_gap: f32,
    /// Left, right, and bottom margin (half a glyph)
    pub margin: f32,
    /// Horizontal advance of one ASCII character
    pub glyph_width: f32,
    /// Height of one line
    pub line_height: f32,
}

impl LayoutMetrics {
    /// Compute the column geometry for the given glyph size, number of address digits,
    /// and number of byte groups per line.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(glyph: GlyphMetrics, address_digits: usize, byte_groups: usize) -> Self {
        let w = glyph.width;
        let margin = w / 2.0;
        let byte_cell_width = 2.0 * w + margin;
        let group_gap = w;

        let groups = byte_groups as f32;
        let gaps = byte_groups.saturating_sub(1) as f32;
        let bytes_per_line = (byte_groups * BYTES_PER_GROUP) as f32;

        Self {
            address_column_width: (address_digits + 1) as f32 * w + 2.0 * margin,
            hex_column_width: groups * (BYTES_PER_GROUP as f32 * byte_cell_width)
                + gaps * group_gap
                + margin,
            ascii_column_width: bytes_per_line * w + 2.0 * margin,
            byte_cell_width,
            group_gap,
            margin,
            glyph_width: w,
            line_height: glyph.height,
        }
    }

    /// Total width of a line: address + hex + ASCII columns
    #[must_use]
    pub fn line_width(&self) -> f32 {
        self.address_column_width + self.hex_column_width + self.ascii_column_width
    }

    /// X offset (from the line start) of the hex column
    #[must_use]
    pub const fn hex_column_x(&self) -> f32 {
        self.address_column_width
    }

    /// X offset (from the line start) of the ASCII column
    #[must_use]
    pub fn ascii_column_x(&self) -> f32 {
        self.address_column_width + self.hex_column_width
    }

    /// X offset (from the line start) of the n-th hex byte of a line
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn byte_cell_x(&self, index_in_line: usize) -> f32 {
        let gaps = (index_in_line / BYTES_PER_GROUP) as f32;
        self.hex_column_x()
            + self.margin
            + index_in_line as f32 * self.byte_cell_width
            + gaps * self.group_gap
    }

    /// X offset (from the line start) of the n-th ASCII character of a line
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn ascii_cell_x(&self, index_in_line: usize) -> f32 {
        self.ascii_column_x() + self.margin + index_in_line as f32 * self.glyph_width
    }
}

/// Width in pixels needed to show a whole line with `byte_groups` groups
#[must_use]
pub fn required_width(glyph: GlyphMetrics, address_digits: usize, byte_groups: usize) -> f32 {
    LayoutMetrics::compute(glyph, address_digits, byte_groups).line_width()
}

/// Choose how many byte groups fit into `available_width` pixels.
///
/// Returns the largest group count whose line width does not exceed the available
/// width, but never less than [`MIN_BYTE_GROUPS`] (nor more than [`MAX_BYTE_GROUPS`]).
/// The search starts at `current_groups`, so the result is stable: fitting again with
/// the same inputs returns the same count.
///
/// # Example
/// ```
/// use bindifflib::layout::{GlyphMetrics, fit};
///
/// let glyph = GlyphMetrics::new(8.0, 16.0);
/// let (groups, metrics) = fit(600.0, glyph, 8, 2);
///
/// assert_eq!(groups, 4);
/// assert!(metrics.line_width() <= 600.0);
/// ```
#[must_use]
pub fn fit(
    available_width: f32,
    glyph: GlyphMetrics,
    address_digits: usize,
    current_groups: usize,
) -> (usize, LayoutMetrics) {
    if !glyph.is_valid() {
        return (
            MIN_BYTE_GROUPS,
            LayoutMetrics::compute(glyph, address_digits, MIN_BYTE_GROUPS),
        );
    }

    let available = if available_width.is_nan() {
        0.0
    } else {
        available_width.max(0.0)
    };
    let needed = |groups| required_width(glyph, address_digits, groups);

    let mut groups = current_groups.clamp(MIN_BYTE_GROUPS, MAX_BYTE_GROUPS);
    loop {
        if groups < MAX_BYTE_GROUPS && available >= needed(groups + 1) {
            groups += 1;
        } else if available < needed(groups) && groups > MIN_BYTE_GROUPS {
            groups -= 1;
        } else {
            // Either fits with less than a group of slack, or clamped at a bound
            break;
        }
    }

    (
        groups,
        LayoutMetrics::compute(glyph, address_digits, groups),
    )
}
