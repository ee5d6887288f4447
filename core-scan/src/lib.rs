//! # Scan Module
//!
//! Resumable, checkpointed scanning of a local music library.
//!
//! ## Overview
//!
//! The walker enumerates eligible audio files under a library root in a
//! deterministic order, fingerprints them (SHA-256, cached by size+mtime),
//! extracts tags through the injected [`TagReader`](core_metadata::TagReader)
//! capability, detects sibling lyric files, and aggregates everything into
//! an in-memory [`LibraryIndex`]. Durable state (fingerprints + cursor)
//! lives under the library root's hidden control directory so a stopped
//! scan resumes exactly where it left off without redoing completed work.
//!
//! ## Components
//!
//! - **Fingerprint Store** (`fingerprint`): path -> hash/size/mtime cache,
//!   JSON-lines on disk, corruption-tolerant per record
//! - **Scan Cursor** (`cursor`): durable traversal position with staleness
//!   detection against a changed file set
//! - **Library Index** (`index`): artist -> album -> tracks aggregation
//!   with lyric-presence counts; derived view, never persisted
//! - **Library Walker** (`walker`): the `Idle -> Scanning -> {Paused,
//!   Completed, Failed}` state machine driving the scan

pub mod cursor;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod walker;

pub use cursor::{CursorStore, ScanCursor};
pub use error::{Result, ScanError};
pub use fingerprint::{Fingerprint, FingerprintStore};
pub use index::{AlbumEntry, FileRecord, LibraryIndex, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
pub use walker::{LibraryWalker, ScanConfig, ScanOutcome, WalkerState};
