//! # Fingerprint Store
//!
//! Durable cache of per-file content fingerprints, keyed by library-root
//! relative path. Each record carries the SHA-256 hash plus the size and
//! mtime observed when the hash was computed, so an unchanged file is never
//! re-hashed on later scans.
//!
//! ## Persistence
//!
//! One JSON object per line in `.tunewatch/fingerprints.jsonl` under the
//! library root. Records are tolerant to partial corruption: an unparsable
//! line is skipped with a warning and the rest of the file still loads. An
//! entirely unreadable store degrades to empty (a full re-hash), never to a
//! failed scan.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

/// Hidden directory under the library root holding scan state.
pub const CONTROL_DIR: &str = ".tunewatch";

const STORE_FILE: &str = "fingerprints.jsonl";

/// Content fingerprint for one library file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Library-root relative path, `/`-separated.
    pub path: String,
    /// Lowercase hex SHA-256 of the file content.
    pub hash: String,
    /// File size in bytes at hash time.
    pub size: u64,
    /// Modification time in milliseconds since the Unix epoch at hash time.
    pub mtime_ms: i64,
}

/// Computes the lowercase hex SHA-256 of a byte buffer.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// In-memory fingerprint map with explicit durable flushes.
///
/// Mutations accumulate in memory; [`flush`](FingerprintStore::flush)
/// rewrites the backing file atomically (temp file + rename). The walker
/// flushes at every checkpoint and on pause/completion.
#[derive(Debug)]
pub struct FingerprintStore {
    store_path: PathBuf,
    entries: BTreeMap<String, Fingerprint>,
    dirty: bool,
}

impl FingerprintStore {
    /// Opens the store for a library root, creating the control directory
    /// when absent.
    pub fn open(library_root: &Path) -> Result<Self> {
        let control_dir = library_root.join(CONTROL_DIR);
        std::fs::create_dir_all(&control_dir)?;
        let store_path = control_dir.join(STORE_FILE);

        let entries = match std::fs::File::open(&store_path) {
            Ok(file) => Self::load_entries(&store_path, file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(
                    path = %store_path.display(),
                    error = %e,
                    "Fingerprint store unreadable, starting empty (full re-hash)"
                );
                BTreeMap::new()
            }
        };

        debug!(
            path = %store_path.display(),
            entries = entries.len(),
            "Opened fingerprint store"
        );

        Ok(Self {
            store_path,
            entries,
            dirty: false,
        })
    }

    fn load_entries(path: &Path, file: std::fs::File) -> BTreeMap<String, Fingerprint> {
        let mut entries = BTreeMap::new();
        let reader = BufReader::new(file);
        for (line_no, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Fingerprint store truncated, keeping records read so far"
                    );
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Fingerprint>(&line) {
                Ok(fp) => {
                    entries.insert(fp.path.clone(), fp);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping corrupt fingerprint record"
                    );
                }
            }
        }
        entries
    }

    /// Looks up the fingerprint for a relative path.
    pub fn get(&self, rel_path: &str) -> Option<&Fingerprint> {
        self.entries.get(rel_path)
    }

    /// Inserts or replaces a fingerprint.
    pub fn insert(&mut self, fingerprint: Fingerprint) {
        self.entries.insert(fingerprint.path.clone(), fingerprint);
        self.dirty = true;
    }

    /// Whether a file needs hashing: true when it is unknown or its size or
    /// mtime differ from the cached record.
    pub fn needs_rehash(&self, rel_path: &str, size: u64, mtime_ms: i64) -> bool {
        match self.entries.get(rel_path) {
            Some(fp) => fp.size != size || fp.mtime_ms != mtime_ms,
            None => true,
        }
    }

    /// Number of cached fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites the backing file atomically. No-op when nothing changed
    /// since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let tmp_path = self.store_path.with_extension("jsonl.tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            for fp in self.entries.values() {
                let line = serde_json::to_string(fp)?;
                file.write_all(line.as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.store_path).map_err(|e| {
            ScanError::Persist(format!(
                "failed to commit fingerprint store {}: {}",
                self.store_path.display(),
                e
            ))
        })?;

        self.dirty = false;
        debug!(entries = self.entries.len(), "Flushed fingerprint store");
        Ok(())
    }
}
