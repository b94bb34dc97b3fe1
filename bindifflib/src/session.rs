//! The `session` module provides [`DiffSession`], the controller that ties the two byte
//! sources, their two views, and the shared [`DiffMap`] together.
//!
//! Every event (load, resize, scroll, font change) is handled synchronously:
//! 1. The affected [`ViewportState`] is updated and reports a [`ViewUpdate`].
//! 2. If its layout changed, the other view is brought to layout parity.
//! 3. The diff window is recomputed before control returns to the caller.
//!
//! The diff map is shared with renderers as a [`SharedDiffMap`]. A recompute that finds
//! the map borrowed by a reader does not write; it is retried on the next event.

use crate::diffmap::{DiffMap, Verdict};
use crate::engine;
use crate::error::BinDiffError;
use crate::layout::GlyphMetrics;
use crate::source::{ByteSource, MappedFile};
use crate::viewport::{ViewUpdate, ViewportState};
use std::cell::RefCell;
use std::ops::Range;
use std::path::Path;
use std::rc::Rc;

/// Diff map handle shared between the session and its renderers
pub type SharedDiffMap = Rc<RefCell<Option<DiffMap>>>;

/// One of the two panes of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Scrolling one view scrolls the other to the same line
    pub link_scrolling: bool,
    /// Glyph size both views are laid out with
    pub glyph: GlyphMetrics,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            link_scrolling: true,
            glyph: GlyphMetrics::default(),
        }
    }
}

pub struct DiffSession<S: ByteSource> {
    config: SessionConfig,
    /// Loaded sources, indexed by [`Side::index`]
    sources: [Option<S>; 2],
    /// Views, indexed by [`Side::index`]
    views: [ViewportState; 2],
    /// Verdicts, present only while two sources are loaded
    diff_map: SharedDiffMap,
    /// A recompute was skipped and has to be retried on the next event
    pending: bool,
    /// Why diffing is off although two sources are loaded
    disabled_reason: Option<String>,
    /// Difference the latest jump landed on
    jump_cursor: Option<u64>,
}

impl<S: ByteSource> Default for DiffSession<S> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<S: ByteSource> DiffSession<S> {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sources: [None, None],
            views: [
                ViewportState::new(config.glyph),
                ViewportState::new(config.glyph),
            ],
            diff_map: Rc::new(RefCell::new(None)),
            pending: false,
            disabled_reason: None,
            jump_cursor: None,
        }
    }

    // -- Accessors

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn source(&self, side: Side) -> Option<&S> {
        self.sources[side.index()].as_ref()
    }

    #[must_use]
    pub const fn view(&self, side: Side) -> &ViewportState {
        &self.views[side.index()]
    }

    /// Handle to the shared diff map for renderers
    #[must_use]
    pub fn diff_map(&self) -> SharedDiffMap {
        Rc::clone(&self.diff_map)
    }

    /// Number of loaded sources (0, 1, or 2)
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }

    /// `true` while two sources are loaded and the diff map exists
    #[must_use]
    pub fn is_diffing(&self) -> bool {
        self.diff_map
            .try_borrow()
            .is_ok_and(|map| map.is_some())
    }

    /// `true` if the latest recompute could not run and will be retried
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Reason why diffing is disabled, if it is
    #[must_use]
    pub fn diff_disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    /// Verdict of one offset, `None` if not diffing or not computed yet
    #[must_use]
    pub fn verdict_at(&self, offset: u64) -> Option<Verdict> {
        let map = self.diff_map.try_borrow().ok()?;
        map.as_ref()?.get(offset)
    }

    /// First computed difference at or after `from`
    #[must_use]
    pub fn next_difference(&self, from: u64) -> Option<u64> {
        let map = self.diff_map.try_borrow().ok()?;
        map.as_ref()?.next_difference(from)
    }

    /// Last computed difference strictly before `before`
    #[must_use]
    pub fn prev_difference(&self, before: u64) -> Option<u64> {
        let map = self.diff_map.try_borrow().ok()?;
        map.as_ref()?.prev_difference(before)
    }

    /// First difference at or after `from`, searched in the sources themselves
    ///
    /// # Errors
    /// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
    pub fn find_next_difference(&self, from: u64) -> Result<Option<u64>, BinDiffError> {
        match (&self.sources[0], &self.sources[1]) {
            (Some(a), Some(b)) => engine::find_next_difference(a, b, from),
            _ => Ok(None),
        }
    }

    /// Last difference strictly before `before`, searched in the sources themselves
    ///
    /// # Errors
    /// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
    pub fn find_prev_difference(&self, before: u64) -> Result<Option<u64>, BinDiffError> {
        match (&self.sources[0], &self.sources[1]) {
            (Some(a), Some(b)) => engine::find_prev_difference(a, b, before),
            _ => Ok(None),
        }
    }

    /// Scroll both views to the next (or previous) difference and return its offset.
    ///
    /// The search starts after the difference the previous jump landed on while that
    /// one is still on screen in `side`, otherwise below (or above) the top line of
    /// `side`.
    ///
    /// # Errors
    /// Propagates [`BinDiffError::OutOfBoundsRead`] from the sources.
    pub fn jump_to_difference(
        &mut self,
        side: Side,
        forward: bool,
    ) -> Result<Option<u64>, BinDiffError> {
        let view = &self.views[side.index()];
        let top = view.scroll_offset_bytes();
        let shown = top..top.saturating_add(view.capacity());
        let cursor = self.jump_cursor.filter(|offset| shown.contains(offset));

        let found = if forward {
            let from = cursor.map_or(top + view.bytes_per_line() as u64, |offset| offset + 1);
            self.find_next_difference(from)?
        } else {
            self.find_prev_difference(cursor.unwrap_or(top))?
        };

        if let Some(offset) = found {
            for side in Side::BOTH {
                let _ = self.scroll_to_offset(side, offset);
            }
            self.jump_cursor = Some(offset);
        }
        Ok(found)
    }

    // -- Sources

    /// Install `source` on `side`, replacing whatever was loaded there.
    ///
    /// The old source and the old diff map are dropped before the new length is
    /// published to the view. With two sources loaded, a new diff map is allocated.
    ///
    /// # Errors
    /// Returns [`BinDiffError::AllocationFailure`] if the diff map cannot be allocated.
    /// The source stays loaded in that case; only diffing is disabled.
    pub fn load(&mut self, side: Side, source: S) -> Result<(), BinDiffError> {
        self.drop_diff_map();
        self.jump_cursor = None;

        let len = source.len();
        self.sources[side.index()] = Some(source);

        log::info!("Loaded {len} bytes into the {} view", side.label());

        let update = self.views[side.index()].set_source_length(len);
        self.sync_views(side, update);

        self.rebuild_diff_map()
    }

    /// Remove the source on `side` and return it. Diffing stops.
    pub fn unload(&mut self, side: Side) -> Option<S> {
        let source = self.sources[side.index()].take()?;

        self.drop_diff_map();
        self.disabled_reason = None;
        self.jump_cursor = None;
        let _ = self.views[side.index()].set_source_length(0);

        log::info!("Unloaded the {} view", side.label());
        Some(source)
    }

    // -- View events

    /// Give a view a new pixel size
    pub fn resize(&mut self, side: Side, width: f32, height: f32) -> ViewUpdate {
        let update = self.views[side.index()].resize(width, height);
        self.handle_update(side, update)
    }

    /// Swap the glyph size of both views (font change)
    pub fn set_glyph_metrics(&mut self, glyph: GlyphMetrics) -> ViewUpdate {
        self.config.glyph = glyph;
        let left = self.views[0].set_glyph_metrics(glyph);
        let right = self.views[1].set_glyph_metrics(glyph);
        let update = self.handle_update(Side::Left, left);
        update.merge(self.handle_update(Side::Right, right))
    }

    pub fn set_link_scrolling(&mut self, linked: bool) {
        self.config.link_scrolling = linked;
        if linked {
            let line = self.views[0].scroll_line();
            let update = self.views[1].scroll_to(line);
            let _ = self.handle_update(Side::Right, update);
        }
    }

    pub fn scroll_to(&mut self, side: Side, line: u64) -> ViewUpdate {
        let update = self.views[side.index()].scroll_to(line);
        self.after_scroll(side, update)
    }

    pub fn scroll_by(&mut self, side: Side, delta_lines: i64) -> ViewUpdate {
        let update = self.views[side.index()].scroll_by(delta_lines);
        self.after_scroll(side, update)
    }

    pub fn scroll_page(&mut self, side: Side, delta_pages: i64) -> ViewUpdate {
        let update = self.views[side.index()].scroll_page(delta_pages);
        self.after_scroll(side, update)
    }

    /// Shift the lines of `side` left by `offset` pixels, and those of the other view too
    /// while scrolling is linked. Returns `true` if any view moved.
    pub fn scroll_horizontal_to(&mut self, side: Side, offset: f32) -> bool {
        let moved = self.views[side.index()].scroll_horizontal_to(offset);
        if !self.config.link_scrolling {
            return moved;
        }
        let other = self.views[side.other().index()].scroll_horizontal_to(offset);
        moved || other
    }

    pub fn scroll_to_offset(&mut self, side: Side, offset: u64) -> ViewUpdate {
        let update = self.views[side.index()].scroll_to_offset(offset);
        self.after_scroll(side, update)
    }

    /// Recompute the diff window for the current scroll positions.
    ///
    /// Returns the written offset range, or `None` if nothing was computed: fewer than
    /// two sources, diffing disabled, or the map is being read right now (retried on
    /// the next event).
    pub fn recompute(&mut self) -> Option<Range<u64>> {
        let (Some(a), Some(b)) = (&self.sources[0], &self.sources[1]) else {
            return None;
        };

        let Ok(mut slot) = self.diff_map.try_borrow_mut() else {
            log::debug!("Diff map is being read, deferring the recompute");
            self.pending = true;
            return None;
        };
        let map = slot.as_mut()?;

        match engine::recompute_window(a, b, &self.views[0], &self.views[1], map) {
            Ok(window) => {
                self.pending = false;
                Some(window)
            }
            Err(err) => {
                log::warn!("Diff recompute failed, retrying on the next event: {err}");
                self.pending = true;
                None
            }
        }
    }

    // -- Internals

    fn after_scroll(&mut self, side: Side, update: ViewUpdate) -> ViewUpdate {
        if self.config.link_scrolling && update.content_changed {
            let line = self.views[side.index()].scroll_line();
            let _ = self.views[side.other().index()].scroll_to(line);
        }
        self.handle_update(side, update)
    }

    /// Bring the other view to layout parity and recompute if anything moved
    fn handle_update(&mut self, side: Side, update: ViewUpdate) -> ViewUpdate {
        self.sync_views(side, update);

        if !update.is_empty() || self.pending {
            let _ = self.recompute();
        }
        update
    }

    fn sync_views(&mut self, side: Side, update: ViewUpdate) {
        if !update.visuals_changed {
            return;
        }

        let [left, right] = &mut self.views;
        let (this, other) = match side {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };

        // Copy layout over, then pick up an escalation the other view had already done
        let _ = other.synchronize_with(this);
        let _ = this.synchronize_with(other);
    }

    fn drop_diff_map(&mut self) {
        if let Ok(mut slot) = self.diff_map.try_borrow_mut() {
            *slot = None;
        } else {
            // A reader still holds the old map, detach it and start a fresh handle
            self.diff_map = Rc::new(RefCell::new(None));
        }
        self.pending = false;
    }

    fn rebuild_diff_map(&mut self) -> Result<(), BinDiffError> {
        let (Some(a), Some(b)) = (&self.sources[0], &self.sources[1]) else {
            return Ok(());
        };
        let len = a.len().max(b.len());

        match DiffMap::allocate(len) {
            Ok(map) => {
                self.drop_diff_map();
                if let Ok(mut slot) = self.diff_map.try_borrow_mut() {
                    *slot = Some(map);
                }
                self.disabled_reason = None;
                let _ = self.recompute();
                Ok(())
            }
            Err(err) => {
                log::warn!("{err}");
                self.disabled_reason = Some(err.to_string());
                Err(err)
            }
        }
    }
}

impl DiffSession<MappedFile> {
    /// Open and map the file at `path` into `side`.
    ///
    /// # Errors
    /// - Returns [`BinDiffError::SourceUnavailable`] if the file cannot be mapped. The
    ///   previously loaded source (if any) stays active.
    /// - Returns [`BinDiffError::AllocationFailure`] as described in [`Self::load`].
    pub fn open<P: AsRef<Path>>(&mut self, side: Side, path: P) -> Result<(), BinDiffError> {
        let file = MappedFile::open(path)?;
        self.load(side, file)
    }
}
