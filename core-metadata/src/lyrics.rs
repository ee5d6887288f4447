//! Lyric Detection and Fetching
//!
//! Lyric files live next to the audio file under the same stem: `.lrc` for
//! synced lyrics, `.txt` for plain text. Detection is a pure filename
//! convention check. Fetching is a pluggable capability ([`LyricSource`])
//! with a documented no-op default; the priority logic here (synced wins
//! over plain, plain is replaced when synced arrives) is testable without
//! any real lyric backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::extractor::TrackTags;

/// Lyric availability for a track, by sibling-file convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LyricStatus {
    /// No lyric file present
    #[default]
    None,
    /// Plain text lyrics (`.txt`)
    Plain,
    /// Synchronized lyrics (`.lrc`)
    Synced,
}

impl LyricStatus {
    /// Detect lyric presence for an audio file path. Synced takes priority
    /// when both siblings exist.
    pub fn detect(audio_path: &Path) -> Self {
        if audio_path.with_extension("lrc").is_file() {
            Self::Synced
        } else if audio_path.with_extension("txt").is_file() {
            Self::Plain
        } else {
            Self::None
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Lyric text retrieval capability.
///
/// Real implementations scrape or query lyric services; the core only
/// depends on this contract. `Ok(None)` means "nothing found" and is the
/// expected answer from the default stub.
#[async_trait]
pub trait LyricSource: Send + Sync {
    /// Search for synchronized (`.lrc`) lyric text.
    async fn search_synced(&self, tags: &TrackTags) -> Result<Option<String>>;

    /// Search for plain (`.txt`) lyric text.
    async fn search_plain(&self, tags: &TrackTags) -> Result<Option<String>>;
}

/// Documented no-op default: never finds anything.
#[derive(Debug, Clone, Default)]
pub struct NoopLyricSource;

#[async_trait]
impl LyricSource for NoopLyricSource {
    async fn search_synced(&self, _tags: &TrackTags) -> Result<Option<String>> {
        Ok(None)
    }

    async fn search_plain(&self, _tags: &TrackTags) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Applies the fetch policy on top of a [`LyricSource`]:
///
/// 1. Files that already have synced lyrics are skipped when
///    `skip_synced` is set.
/// 2. Synced lyrics are searched first; saving them replaces an existing
///    plain file.
/// 3. Plain lyrics are only searched when the track has no lyrics at all.
pub struct LyricFetcher<S: LyricSource> {
    source: S,
    skip_synced: bool,
}

impl<S: LyricSource> LyricFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            skip_synced: true,
        }
    }

    pub fn with_skip_synced(mut self, skip_synced: bool) -> Self {
        self.skip_synced = skip_synced;
        self
    }

    /// Fetch lyrics for one track and persist them as sibling files.
    ///
    /// Returns the lyric status after fetching (unchanged when nothing was
    /// found).
    pub async fn fetch_for(&self, audio_path: &Path, tags: &TrackTags) -> Result<LyricStatus> {
        let current = LyricStatus::detect(audio_path);

        if self.skip_synced && current.is_synced() {
            debug!(path = %audio_path.display(), "Synced lyrics present, skipping");
            return Ok(current);
        }

        if let Some(content) = self.source.search_synced(tags).await? {
            self.save(audio_path.with_extension("lrc"), &content)?;
            let plain_path = audio_path.with_extension("txt");
            if plain_path.is_file() {
                if let Err(e) = std::fs::remove_file(&plain_path) {
                    warn!(path = %plain_path.display(), error = %e, "Failed to remove superseded plain lyrics");
                }
            }
            return Ok(LyricStatus::Synced);
        }

        if current == LyricStatus::None {
            if let Some(content) = self.source.search_plain(tags).await? {
                self.save(audio_path.with_extension("txt"), &content)?;
                return Ok(LyricStatus::Plain);
            }
        }

        Ok(current)
    }

    fn save(&self, path: PathBuf, content: &str) -> Result<()> {
        std::fs::write(&path, content).map_err(|e| {
            MetadataError::LyricsFetchFailed(format!(
                "failed to save lyrics to {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "Saved lyrics");
        Ok(())
    }
}
