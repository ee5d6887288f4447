//! # Release Ledger
//!
//! Durable record of every remote release already surfaced to the user.
//! A release identifier present in the ledger is never announced again,
//! across process restarts. Writes are append-only and synced before the
//! corresponding event is emitted, so a crash cannot cause a duplicate
//! announcement.
//!
//! Persisted as one JSON object per line in `known_releases.jsonl` under
//! the data directory. Corrupt lines are skipped on load; losing a record
//! means one repeated announcement, never a failed pass.

use bridge_traits::catalog::ReleaseKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ReconcileError, Result};

const LEDGER_FILE: &str = "known_releases.jsonl";

/// One announced release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Remote release identifier, the dedup key.
    pub release_id: String,
    pub artist: String,
    pub title: String,
    /// First release date as reported by the remote.
    pub date: Option<String>,
    pub kind: ReleaseKind,
    /// When this release was first seen by a reconciliation pass.
    pub first_seen: DateTime<Utc>,
}

/// Append-only known-release store.
#[derive(Debug)]
pub struct ReleaseLedger {
    path: PathBuf,
    known: HashSet<String>,
}

impl ReleaseLedger {
    /// Opens the ledger under a data directory, creating it when absent.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LEDGER_FILE);

        let mut known = HashSet::new();
        match std::fs::File::open(&path) {
            Ok(file) => {
                for (line_no, line) in BufReader::new(file).lines().enumerate() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Ledger truncated");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<LedgerEntry>(&line) {
                        Ok(entry) => {
                            known.insert(entry.release_id);
                        }
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                line = line_no + 1,
                                error = %e,
                                "Skipping corrupt ledger record"
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ledger unreadable, starting empty");
            }
        }

        debug!(path = %path.display(), known = known.len(), "Opened release ledger");
        Ok(Self { path, known })
    }

    pub fn contains(&self, release_id: &str) -> bool {
        self.known.contains(release_id)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Appends an entry and syncs it to disk before returning. Callers
    /// emit the announcement only after this succeeds.
    pub fn add(&mut self, entry: LedgerEntry) -> Result<()> {
        let line = serde_json::to_string(&entry)?;
        let mut file = std::fs::File::options()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_data().map_err(|e| {
            ReconcileError::Persist(format!(
                "failed to sync ledger {}: {}",
                self.path.display(),
                e
            ))
        })?;
        self.known.insert(entry.release_id);
        Ok(())
    }
}
