//! # Metadata Module
//!
//! Audio tag extraction and lyric handling for the scan pipeline.
//!
//! ## Components
//!
//! - **Tag Reader** (`extractor`): the [`TagReader`] capability consumed by
//!   the library walker, with a `lofty`-backed default implementation
//! - **Lyrics** (`lyrics`): sibling-file lyric detection (`.lrc` synced,
//!   `.txt` plain) and the pluggable [`LyricSource`] fetch capability with
//!   its synced-over-plain priority logic

pub mod error;
pub mod extractor;
pub mod lyrics;

pub use error::{MetadataError, Result};
pub use extractor::{LoftyTagReader, TagReader, TrackTags};
pub use lyrics::{LyricFetcher, LyricSource, LyricStatus, NoopLyricSource};
