//! # Library Index
//!
//! In-memory artist -> album -> tracks aggregation built during a scan.
//! The index is a derived view: it is rebuilt from the fingerprint store
//! plus freshly extracted tags on every scan and never persisted itself.

use core_metadata::{LyricStatus, TrackTags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket for tracks whose artist tag is missing.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Bucket for tracks whose album tag is missing.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One processed library file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Library-root relative path, `/`-separated.
    pub path: String,
    /// Lowercase hex SHA-256 of the content.
    pub hash: String,
    pub size: u64,
    pub mtime_ms: i64,
    pub tags: TrackTags,
    pub lyrics: LyricStatus,
    /// Non-fatal problem noted while processing this file (extraction
    /// failure, missing tags, content change under an unchanged stat).
    pub error: Option<String>,
}

/// Tracks grouped under one album, with lyric-presence counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumEntry {
    pub tracks: Vec<FileRecord>,
    pub synced_lyrics: usize,
    pub plain_lyrics: usize,
}

impl AlbumEntry {
    fn add(&mut self, record: FileRecord) {
        match record.lyrics {
            LyricStatus::Synced => self.synced_lyrics += 1,
            LyricStatus::Plain => self.plain_lyrics += 1,
            LyricStatus::None => {}
        }
        self.tracks.push(record);
    }
}

/// The scan's aggregated view of the library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryIndex {
    artists: BTreeMap<String, BTreeMap<String, AlbumEntry>>,
}

impl LibraryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, bucketing missing artist or album tags under the
    /// `Unknown` placeholders.
    pub fn add(&mut self, record: FileRecord) {
        let artist = record
            .tags
            .artist
            .clone()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let album = record
            .tags
            .album
            .clone()
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

        self.artists
            .entry(artist)
            .or_default()
            .entry(album)
            .or_default()
            .add(record);
    }

    /// Artist names suitable for catalog reconciliation: every indexed
    /// artist except the unknown bucket.
    pub fn known_artists(&self) -> Vec<&str> {
        self.artists
            .keys()
            .filter(|name| name.as_str() != UNKNOWN_ARTIST)
            .map(String::as_str)
            .collect()
    }

    pub fn artists(&self) -> &BTreeMap<String, BTreeMap<String, AlbumEntry>> {
        &self.artists
    }

    pub fn albums_for(&self, artist: &str) -> Option<&BTreeMap<String, AlbumEntry>> {
        self.artists.get(artist)
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn track_count(&self) -> usize {
        self.artists
            .values()
            .flat_map(|albums| albums.values())
            .map(|album| album.tracks.len())
            .sum()
    }
}
