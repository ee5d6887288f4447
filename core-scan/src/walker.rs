//! # Library Walker
//!
//! The resumable scan state machine: `Idle -> Scanning -> {Paused,
//! Completed, Failed}`.
//!
//! ## Overview
//!
//! A scan enumerates eligible audio files under the library root in a
//! deterministic sorted order, then walks the listing from the persisted
//! cursor position. Files before the cursor are hydrated from the
//! fingerprint store (no stat, no hash) with freshly extracted tags, so a
//! resumed walk produces the same [`LibraryIndex`] an uninterrupted walk
//! would. Files at or after the cursor are fully processed: stat, hash
//! (cached by size+mtime), tag extraction, lyric detection.
//!
//! Stops are honored at file boundaries only. Every `checkpoint_every`
//! files the fingerprint store is flushed and then the cursor is committed;
//! the cursor rename is the checkpoint's commit point, so a crash between
//! the two leaves only surplus fingerprints behind, which is harmless.
//!
//! ## Usage
//!
//! ```ignore
//! let walker = LibraryWalker::new("/music", ScanConfig::default(), tag_reader, bus);
//! let outcome = walker.start().await?;
//! assert_eq!(outcome.state, WalkerState::Completed);
//! ```

use core_metadata::{LyricStatus, TagReader, TrackTags};
use core_runtime::config::WatchConfig;
use core_runtime::events::{CoreEvent, EventBus, ScanEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::UNIX_EPOCH;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cursor::{CursorStore, ScanCursor};
use crate::error::{Result, ScanError};
use crate::fingerprint::{sha256_hex, Fingerprint, FingerprintStore, CONTROL_DIR};
use crate::index::{FileRecord, LibraryIndex};

/// Audio extensions scanned by default.
const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg"];

/// Walker tunables.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Lowercase extensions of eligible files.
    pub extensions: Vec<String>,
    /// Files processed between durable checkpoints.
    pub checkpoint_every: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            checkpoint_every: 25,
        }
    }
}

/// Lifecycle state of the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Idle,
    Scanning,
    Paused,
    Completed,
    Failed,
}

/// Result of one `start()` call.
#[derive(Debug)]
pub struct ScanOutcome {
    pub state: WalkerState,
    pub index: LibraryIndex,
    /// Files confirmed so far (hydrated + freshly processed).
    pub processed: usize,
    /// Eligible files in the listing.
    pub total: usize,
    /// Per-file problems noted without aborting the scan.
    pub errors: Vec<(PathBuf, String)>,
}

/// Resumable library scanner.
pub struct LibraryWalker {
    root: PathBuf,
    config: ScanConfig,
    tag_reader: Arc<dyn TagReader>,
    events: EventBus,
    cancel: StdMutex<CancellationToken>,
    state: StdMutex<WalkerState>,
}

impl LibraryWalker {
    pub fn new(
        root: impl AsRef<Path>,
        config: ScanConfig,
        tag_reader: Arc<dyn TagReader>,
        events: EventBus,
    ) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
            tag_reader,
            events,
            cancel: StdMutex::new(CancellationToken::new()),
            state: StdMutex::new(WalkerState::Idle),
        }
    }

    /// Builds a walker from the shared configuration: library root,
    /// checkpoint granularity, and tag reader all come from
    /// [`WatchConfig`].
    pub fn from_config(config: &WatchConfig, events: EventBus) -> Self {
        Self::new(
            &config.library_root,
            ScanConfig {
                checkpoint_every: config.checkpoint_every,
                ..ScanConfig::default()
            },
            Arc::clone(&config.tag_reader),
            events,
        )
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WalkerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Requests a stop. The running scan honors it at the next file
    /// boundary; without a running scan this is a no-op.
    pub fn request_stop(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }

    fn set_state(&self, state: WalkerState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn emit(&self, event: ScanEvent) {
        // No subscribers is fine; the event is dropped.
        self.events.emit(CoreEvent::Scan(event)).ok();
    }

    /// Runs a scan to completion, pause, or failure.
    ///
    /// A fresh walk starts at index 0; a persisted, non-stale cursor makes
    /// the walk resume where the previous one stopped. Calling `start`
    /// while a scan is already running is a no-op reporting the `Scanning`
    /// state.
    pub async fn start(&self) -> Result<ScanOutcome> {
        // Claim the Scanning state under the lock so exactly one of two
        // concurrent starts wins; the loser sees the claim and backs off.
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == WalkerState::Scanning {
                debug!("Scan already in progress, ignoring start request");
                return Ok(ScanOutcome {
                    state: WalkerState::Scanning,
                    index: LibraryIndex::new(),
                    processed: 0,
                    total: 0,
                    errors: Vec::new(),
                });
            }
            *state = WalkerState::Scanning;
        }

        if !self.root.is_dir() {
            self.set_state(WalkerState::Failed);
            let message = format!("library root not accessible: {}", self.root.display());
            self.emit(ScanEvent::Failed { message });
            return Err(ScanError::RootUnavailable(self.root.clone()));
        }

        // Re-arm after a previous stop so the same walker can resume.
        let token = {
            let mut guard = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
            if guard.is_cancelled() {
                *guard = CancellationToken::new();
            }
            guard.clone()
        };

        let outcome = self.run(token).await;
        if let Err(ref e) = outcome {
            self.set_state(WalkerState::Failed);
            self.emit(ScanEvent::Failed {
                message: e.to_string(),
            });
        }
        outcome
    }

    async fn run(&self, token: CancellationToken) -> Result<ScanOutcome> {
        let listing = self.enumerate();
        let total = listing.len();

        let mut fingerprints = FingerprintStore::open(&self.root)?;
        let cursor_store = CursorStore::new(&self.root);

        let start_index = match cursor_store.load() {
            Some(cursor) if cursor.completed => 0,
            Some(cursor) if cursor.is_stale(total) => {
                info!(
                    recorded = cursor.total_files,
                    current = total,
                    "File set changed since last scan, restarting from the beginning"
                );
                cursor_store.clear()?;
                0
            }
            Some(cursor) => cursor.next_index.min(total),
            None => 0,
        };

        info!(total, resumed_from = start_index, "Scan started");
        self.emit(ScanEvent::Started {
            total,
            resumed_from: start_index,
        });

        let mut index = LibraryIndex::new();
        let mut errors: Vec<(PathBuf, String)> = Vec::new();
        let mut processed = 0usize;

        // Hydrate confirmed files from the store; tags are still extracted
        // fresh so the resumed index matches an uninterrupted one.
        for path in &listing[..start_index] {
            let record = self.hydrate(path, &fingerprints, &mut errors).await;
            index.add(record);
            processed += 1;
        }

        for (i, path) in listing.iter().enumerate().skip(start_index) {
            if token.is_cancelled() {
                fingerprints.flush()?;
                cursor_store.save(&ScanCursor {
                    next_index: i,
                    total_files: total,
                    completed: false,
                })?;
                info!(processed, total, "Scan paused");
                self.set_state(WalkerState::Paused);
                self.emit(ScanEvent::Paused { processed, total });
                return Ok(ScanOutcome {
                    state: WalkerState::Paused,
                    index,
                    processed,
                    total,
                    errors,
                });
            }

            let record = self.process(path, &mut fingerprints, &mut errors).await;
            if let Some(record) = record {
                index.add(record);
            }
            processed += 1;
            self.emit(ScanEvent::Progress { processed, total });

            if (processed - start_index) % self.config.checkpoint_every == 0 {
                fingerprints.flush()?;
                cursor_store.save(&ScanCursor {
                    next_index: i + 1,
                    total_files: total,
                    completed: false,
                })?;
                debug!(processed, "Checkpoint committed");
                self.emit(ScanEvent::Checkpoint { processed });
            }
        }

        fingerprints.flush()?;
        cursor_store.clear()?;
        info!(processed, errors = errors.len(), "Scan completed");
        self.set_state(WalkerState::Completed);
        self.emit(ScanEvent::Completed {
            processed,
            error_count: errors.len(),
        });

        Ok(ScanOutcome {
            state: WalkerState::Completed,
            index,
            processed,
            total,
            errors,
        })
    }

    /// Sorted listing of eligible files. The control directory is skipped
    /// entirely; order is byte order of the full path, stable across runs.
    fn enumerate(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != CONTROL_DIR)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.is_eligible(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        files
    }

    fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.config.extensions.iter().any(|e| e == &ext))
            .unwrap_or(false)
    }

    fn rel_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Rebuilds the record for an already-confirmed file from its cached
    /// fingerprint plus fresh tags. Falls back to a zeroed fingerprint when
    /// the store lost the record.
    async fn hydrate(
        &self,
        path: &Path,
        fingerprints: &FingerprintStore,
        errors: &mut Vec<(PathBuf, String)>,
    ) -> FileRecord {
        let rel = self.rel_path(path);
        let (hash, size, mtime_ms) = match fingerprints.get(&rel) {
            Some(fp) => (fp.hash.clone(), fp.size, fp.mtime_ms),
            None => {
                warn!(path = %rel, "Confirmed file missing from fingerprint store");
                (String::new(), 0, 0)
            }
        };
        self.build_record(path, rel, hash, size, mtime_ms, errors)
            .await
    }

    /// Fully processes one file: stat, hash (reusing the cached hash when
    /// size and mtime are unchanged), tags, lyrics. Returns `None` when the
    /// file could not even be stat'ed.
    async fn process(
        &self,
        path: &Path,
        fingerprints: &mut FingerprintStore,
        errors: &mut Vec<(PathBuf, String)>,
    ) -> Option<FileRecord> {
        let rel = self.rel_path(path);

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                let message = format!("stat failed: {}", e);
                warn!(path = %rel, error = %e, "File vanished or unreadable, skipping");
                self.emit(ScanEvent::FileError {
                    path: path.to_path_buf(),
                    message: message.clone(),
                });
                errors.push((path.to_path_buf(), message));
                return None;
            }
        };

        let size = metadata.len();
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let hash = if fingerprints.needs_rehash(&rel, size, mtime_ms) {
            match tokio::fs::read(path).await {
                Ok(data) => {
                    let hash = sha256_hex(&data);
                    fingerprints.insert(Fingerprint {
                        path: rel.clone(),
                        hash: hash.clone(),
                        size,
                        mtime_ms,
                    });
                    hash
                }
                Err(e) => {
                    let message = format!("read failed: {}", e);
                    self.emit(ScanEvent::FileError {
                        path: path.to_path_buf(),
                        message: message.clone(),
                    });
                    errors.push((path.to_path_buf(), message));
                    String::new()
                }
            }
        } else {
            // Unchanged by size+mtime; the cached record is present.
            fingerprints
                .get(&rel)
                .map(|fp| fp.hash.clone())
                .unwrap_or_default()
        };

        Some(
            self.build_record(path, rel, hash, size, mtime_ms, errors)
                .await,
        )
    }

    /// Shared by the hydrate and process paths so both yield identical
    /// records for identical inputs.
    async fn build_record(
        &self,
        path: &Path,
        rel: String,
        hash: String,
        size: u64,
        mtime_ms: i64,
        errors: &mut Vec<(PathBuf, String)>,
    ) -> FileRecord {
        let (mut tags, mut error) = match self.tag_reader.read_tags(path).await {
            Ok(tags) => (tags, None),
            Err(e) => {
                let message = format!("tag extraction failed: {}", e);
                self.emit(ScanEvent::FileError {
                    path: path.to_path_buf(),
                    message: message.clone(),
                });
                errors.push((path.to_path_buf(), message.clone()));
                (TrackTags::default(), Some(message))
            }
        };

        if tags.title.is_none() {
            tags.title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        if error.is_none() && tags.is_untagged() {
            error = Some("artist and album tags missing".to_string());
        }

        FileRecord {
            path: rel,
            hash,
            size,
            mtime_ms,
            tags,
            lyrics: LyricStatus::detect(path),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::catalog::{ArtistMatch, ReleaseKind, RemoteCatalog, RemoteRelease};
    use bridge_traits::credentials::StaticCredentialStore;
    use core_metadata::error::Result as MetadataResult;
    use core_metadata::MetadataError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Catalog stub for configs that never reconcile.
    struct EmptyCatalog;

    #[async_trait]
    impl RemoteCatalog for EmptyCatalog {
        async fn search_artist(
            &self,
            _name: &str,
        ) -> bridge_traits::error::Result<Vec<ArtistMatch>> {
            Ok(vec![])
        }

        async fn list_releases(
            &self,
            _artist_id: &str,
            _kinds: &[ReleaseKind],
        ) -> bridge_traits::error::Result<Vec<RemoteRelease>> {
            Ok(vec![])
        }
    }

    /// Derives tags from a `Artist - Album - Title.ext` filename, without
    /// opening the file.
    struct NameTagReader;

    fn tags_from_name(path: &Path) -> TrackTags {
        let stem = path.file_stem().unwrap().to_string_lossy();
        let parts: Vec<&str> = stem.split(" - ").collect();
        if parts.len() == 3 {
            TrackTags {
                artist: Some(parts[0].to_string()),
                album: Some(parts[1].to_string()),
                title: Some(parts[2].to_string()),
            }
        } else {
            TrackTags::default()
        }
    }

    #[async_trait]
    impl TagReader for NameTagReader {
        async fn read_tags(&self, path: &Path) -> MetadataResult<TrackTags> {
            Ok(tags_from_name(path))
        }
    }

    /// Cancels the shared token after reading a set number of files.
    struct CancellingReader {
        token: CancellationToken,
        after: usize,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl TagReader for CancellingReader {
        async fn read_tags(&self, path: &Path) -> MetadataResult<TrackTags> {
            let count = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            if count >= self.after {
                self.token.cancel();
            }
            Ok(tags_from_name(path))
        }
    }

    /// Parks inside tag extraction until released, so a test can observe
    /// the walker mid-scan.
    struct GateReader {
        entered: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl TagReader for GateReader {
        async fn read_tags(&self, path: &Path) -> MetadataResult<TrackTags> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(tags_from_name(path))
        }
    }

    /// Fails extraction for paths containing a marker.
    struct FailingReader;

    #[async_trait]
    impl TagReader for FailingReader {
        async fn read_tags(&self, path: &Path) -> MetadataResult<TrackTags> {
            if path.to_string_lossy().contains("broken") {
                Err(MetadataError::ExtractionFailed("bad frame".to_string()))
            } else {
                Ok(tags_from_name(path))
            }
        }
    }

    fn write_library(dir: &TempDir) -> Vec<PathBuf> {
        let files = [
            "Asha/First/Asha - First - One.mp3",
            "Asha/First/Asha - First - Two.flac",
            "Beryl/Stone/Beryl - Stone - Uno.ogg",
            "Beryl/Stone/Beryl - Stone - Dos.m4a",
            "loose notes.txt",
            "Beryl/Stone/cover.jpg",
        ];
        let mut paths = Vec::new();
        for name in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, name.as_bytes()).unwrap();
            paths.push(path);
        }
        paths
    }

    fn walker(dir: &TempDir, reader: Arc<dyn TagReader>) -> LibraryWalker {
        let config = ScanConfig {
            checkpoint_every: 2,
            ..ScanConfig::default()
        };
        LibraryWalker::new(dir.path(), config, reader, EventBus::default())
    }

    #[tokio::test]
    async fn test_full_scan_builds_index() {
        let dir = TempDir::new().unwrap();
        write_library(&dir);

        let w = walker(&dir, Arc::new(NameTagReader));
        let outcome = w.start().await.unwrap();

        assert_eq!(outcome.state, WalkerState::Completed);
        assert_eq!(w.state(), WalkerState::Completed);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.processed, 4);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.index.artist_count(), 2);
        assert_eq!(outcome.index.known_artists(), vec!["Asha", "Beryl"]);

        // Fingerprints persisted, cursor cleared.
        assert!(dir
            .path()
            .join(CONTROL_DIR)
            .join("fingerprints.jsonl")
            .is_file());
        assert!(CursorStore::new(dir.path()).load().is_none());
    }

    #[tokio::test]
    async fn test_stop_then_resume_matches_uninterrupted_scan() {
        let dir = TempDir::new().unwrap();
        let originals = write_library(&dir);

        // Share one token so the reader can stop the scan it runs inside.
        let token = CancellationToken::new();
        let stopping = walker(
            &dir,
            Arc::new(CancellingReader {
                token: token.clone(),
                after: 1,
                reads: AtomicUsize::new(0),
            }),
        );
        *stopping.cancel.lock().unwrap() = token;

        let paused = stopping.start().await.unwrap();
        assert_eq!(paused.state, WalkerState::Paused);
        assert!(paused.processed < paused.total);
        let cursor = CursorStore::new(dir.path()).load().unwrap();
        assert_eq!(cursor.next_index, paused.processed);
        assert!(!cursor.completed);

        // Resume with a fresh walker over the same stores.
        let resumed = walker(&dir, Arc::new(NameTagReader)).start().await.unwrap();
        assert_eq!(resumed.state, WalkerState::Completed);
        assert_eq!(resumed.processed, resumed.total);

        // Reference scan of an identical untouched library. Mirror the
        // originals' mtimes so the indexes are comparable byte-for-byte.
        let reference_dir = TempDir::new().unwrap();
        let references = write_library(&reference_dir);
        for (original, reference) in originals.iter().zip(&references) {
            let mtime = std::fs::metadata(original).unwrap().modified().unwrap();
            let file = std::fs::File::options()
                .write(true)
                .open(reference)
                .unwrap();
            file.set_modified(mtime).unwrap();
        }
        let reference = walker(&reference_dir, Arc::new(NameTagReader))
            .start()
            .await
            .unwrap();

        assert_eq!(resumed.index, reference.index);
    }

    #[tokio::test]
    async fn test_unchanged_files_are_not_rehashed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Asha - First - One.mp3");
        std::fs::write(&path, b"original-bytes").unwrap();

        let w = walker(&dir, Arc::new(NameTagReader));
        let first = w.start().await.unwrap();
        let original_hash = sha256_hex(b"original-bytes");
        assert_eq!(
            first.index.artists()["Asha"]["First"].tracks[0].hash,
            original_hash
        );

        // Rewrite the content but restore size and mtime; the cached hash
        // must be reused, proving the bytes were not re-read.
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();
        std::fs::write(&path, b"replaced-bytes").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(mtime).unwrap();
        drop(file);

        let second = walker(&dir, Arc::new(NameTagReader)).start().await.unwrap();
        assert_eq!(
            second.index.artists()["Asha"]["First"].tracks[0].hash,
            original_hash
        );
    }

    #[tokio::test]
    async fn test_stale_cursor_restarts_from_zero() {
        let dir = TempDir::new().unwrap();
        write_library(&dir);
        CursorStore::new(dir.path())
            .save(&ScanCursor {
                next_index: 3,
                total_files: 99,
                completed: false,
            })
            .unwrap();

        let w = walker(&dir, Arc::new(NameTagReader));
        let mut rx = w.events.subscribe();
        let outcome = w.start().await.unwrap();

        assert_eq!(outcome.state, WalkerState::Completed);
        assert_eq!(outcome.processed, 4);
        match rx.recv().await.unwrap() {
            CoreEvent::Scan(ScanEvent::Started { resumed_from, .. }) => {
                assert_eq!(resumed_from, 0)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_while_scanning_is_noop() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Asha - First - One.mp3"), b"x").unwrap();

        let entered = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let w = Arc::new(walker(
            &dir,
            Arc::new(GateReader {
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            }),
        ));

        let background = tokio::spawn({
            let w = Arc::clone(&w);
            async move { w.start().await }
        });

        // The first scan is parked inside tag extraction; a second start
        // must back off without touching the stores.
        entered.notified().await;
        let noop = w.start().await.unwrap();
        assert_eq!(noop.state, WalkerState::Scanning);
        assert_eq!(noop.total, 0);
        assert_eq!(noop.processed, 0);

        release.notify_one();
        let outcome = background.await.unwrap().unwrap();
        assert_eq!(outcome.state, WalkerState::Completed);
        assert_eq!(outcome.processed, 1);
    }

    #[tokio::test]
    async fn test_from_config_wires_root_reader_and_checkpointing() {
        let dir = TempDir::new().unwrap();
        write_library(&dir);

        let config = WatchConfig::builder()
            .library_root(dir.path())
            .data_dir(dir.path().join("data"))
            .catalog(Arc::new(EmptyCatalog))
            .credentials(Arc::new(StaticCredentialStore::empty()))
            .tag_reader(Arc::new(NameTagReader))
            .checkpoint_every(2)
            .build()
            .unwrap();

        let w = LibraryWalker::from_config(&config, EventBus::default());
        let mut rx = w.events.subscribe();
        let outcome = w.start().await.unwrap();

        // Root and tag reader came from the config.
        assert_eq!(outcome.state, WalkerState::Completed);
        assert_eq!(outcome.index.known_artists(), vec!["Asha", "Beryl"]);

        // So did the checkpoint granularity: 4 files at every-2 means two
        // checkpoints.
        let mut checkpoints = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, CoreEvent::Scan(ScanEvent::Checkpoint { .. })) {
                checkpoints += 1;
            }
        }
        assert_eq!(checkpoints, 2);
    }

    #[tokio::test]
    async fn test_missing_root_fails() {
        let walker = LibraryWalker::new(
            "/nonexistent/library",
            ScanConfig::default(),
            Arc::new(NameTagReader),
            EventBus::default(),
        );
        let err = walker.start().await.unwrap_err();
        assert!(matches!(err, ScanError::RootUnavailable(_)));
        assert_eq!(walker.state(), WalkerState::Failed);
    }

    #[tokio::test]
    async fn test_extraction_failure_annotates_and_continues() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("Asha - First - One.mp3"), b"y").unwrap();

        let outcome = walker(&dir, Arc::new(FailingReader)).start().await.unwrap();
        assert_eq!(outcome.state, WalkerState::Completed);
        assert_eq!(outcome.errors.len(), 1);

        // The broken file lands in the unknown bucket with an annotation
        // and a stem-derived title.
        let unknown = &outcome.index.artists()[crate::index::UNKNOWN_ARTIST]
            [crate::index::UNKNOWN_ALBUM];
        assert_eq!(unknown.tracks.len(), 1);
        assert!(unknown.tracks[0].error.is_some());
        assert_eq!(unknown.tracks[0].tags.title.as_deref(), Some("broken"));
    }

    #[tokio::test]
    async fn test_untagged_file_is_annotated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nodash.mp3"), b"x").unwrap();

        let outcome = walker(&dir, Arc::new(NameTagReader)).start().await.unwrap();
        let unknown = &outcome.index.artists()[crate::index::UNKNOWN_ARTIST]
            [crate::index::UNKNOWN_ALBUM];
        assert_eq!(
            unknown.tracks[0].error.as_deref(),
            Some("artist and album tags missing")
        );
    }
}
