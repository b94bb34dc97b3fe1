//! # `bindifflib`
//!
//! `bindifflib` is the engine behind a side-by-side binary file comparator. It finds the
//! byte offsets where two (arbitrarily large, memory mapped) files differ, but only for
//! the bytes that are currently visible, so scrolling through multi-gigabyte files stays
//! responsive.
//!
//! The library provides:
//! - Read-only byte sources (via [`ByteSource`], [`MappedFile`], [`MemorySource`]).
//! - Line layout fitting for a fixed-pitch hex view (via [`layout::fit`]).
//! - Per-view scroll state (via [`ViewportState`]).
//! - The windowed diff (via [`engine::recompute_window`]) writing into a [`DiffMap`].
//! - A controller driving all of the above for two views (via [`DiffSession`]).
//! - Error handling with [`BinDiffError`].
//!
//! ## Example
//!
//! ```
//! use bindifflib::{DiffSession, MemorySource, Side, Verdict};
//!
//! let mut session = DiffSession::default();
//! session.load(Side::Left, MemorySource::from(vec![0x00, 0x01, 0x02, 0xFF])).unwrap();
//! session.load(Side::Right, MemorySource::from(vec![0x00, 0x01, 0x03])).unwrap();
//! session.resize(Side::Left, 600.0, 400.0);
//!
//! assert_eq!(session.verdict_at(2), Some(Verdict::Mismatch));
//! assert_eq!(session.verdict_at(3), Some(Verdict::OutOfRange));
//! ```

mod diffmap;
pub mod engine;
mod error;
pub mod layout;
mod session;
mod source;
mod viewport;

// Public APIs
pub use diffmap::{DiffMap, Verdict};
pub use engine::DiffSummary;
pub use error::BinDiffError;
pub use layout::{GlyphMetrics, LayoutMetrics};
pub use session::{DiffSession, SessionConfig, SharedDiffMap, Side};
pub use source::{ByteSource, MappedFile, MemorySource};
pub use viewport::{DEFAULT_ADDRESS_DIGITS, ViewUpdate, ViewportState, WIDE_ADDRESS_DIGITS};
