//! Audio Tag Extraction
//!
//! Reads the artist/album/title fields the scan pipeline needs, using the
//! `lofty` crate (ID3v2, Vorbis Comments, MP4 tags, FLAC).
//!
//! Extraction is a capability consumed by the walker: tests inject a fake
//! [`TagReader`], production wires [`LoftyTagReader`]. Absence of any field
//! is a valid result, not an error; only an unreadable or unparseable file
//! fails.

use async_trait::async_trait;
use lofty::config::ParseOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{MetadataError, Result};

/// Tag fields extracted from an audio file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTags {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
}

impl TrackTags {
    /// True when neither artist nor album could be read.
    pub fn is_untagged(&self) -> bool {
        self.artist.is_none() && self.album.is_none()
    }
}

/// Tag extraction capability consumed by the library walker.
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Read tags from an audio file.
    ///
    /// Returns `Err` only when the file cannot be read or parsed at all;
    /// missing individual fields are reported as `None`.
    async fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

/// `lofty`-backed tag reader.
pub struct LoftyTagReader {
    parse_options: ParseOptions,
}

impl LoftyTagReader {
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::new(),
        }
    }

    /// Trim whitespace and collapse empty strings to `None`.
    fn normalize(value: Option<impl AsRef<str>>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.as_ref().trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }
}

impl Default for LoftyTagReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagReader for LoftyTagReader {
    async fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        debug!("Reading tags from: {}", path.display());

        let file_data = tokio::fs::read(path).await?;

        let tagged_file = Probe::new(std::io::Cursor::new(&file_data))
            .options(self.parse_options)
            .guess_file_type()
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to probe file: {}", e)))?
            .read()
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to parse file: {}", e)))?;

        // Primary tag first, falling back to the first tag of any type.
        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let tags = match tag {
            Some(tag) => TrackTags {
                artist: Self::normalize(tag.artist()),
                album: Self::normalize(tag.album()),
                title: Self::normalize(tag.title()),
            },
            None => TrackTags::default(),
        };

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            LoftyTagReader::normalize(Some("  Artist  ")),
            Some("Artist".to_string())
        );
        assert_eq!(LoftyTagReader::normalize(Some("   ")), None);
        assert_eq!(LoftyTagReader::normalize(None::<&str>), None);
    }

    #[test]
    fn test_untagged() {
        let tags = TrackTags::default();
        assert!(tags.is_untagged());

        let tagged = TrackTags {
            artist: Some("Artist".to_string()),
            ..Default::default()
        };
        assert!(!tagged.is_untagged());
    }

    #[tokio::test]
    async fn test_garbage_file_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio data").unwrap();

        let reader = LoftyTagReader::new();
        let err = reader.read_tags(&path).await.unwrap_err();
        assert!(matches!(err, MetadataError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let reader = LoftyTagReader::new();
        let err = reader
            .read_tags(Path::new("/nonexistent/track.flac"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Io(_)));
    }
}
