//! # Artist Resolution Cache
//!
//! Durable name -> remote identity mapping filled in by phase 1 of a
//! reconciliation pass. Negative results are cached too: an artist the
//! remote could not match (or that stayed unreachable past the retry
//! budget) is recorded as `NotFound` so later passes do not burn rate
//! budget re-asking.
//!
//! Persisted append-only as JSON lines in `artists.jsonl`; the latest
//! record for a name wins on load, so re-resolving an artist is a plain
//! append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ReconcileError, Result};

const CACHE_FILE: &str = "artists.jsonl";

/// Resolution outcome for one artist name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtistStatus {
    /// Matched to a remote identity.
    Resolved { remote_id: String },
    /// No acceptable match, or transport failures exhausted the retry
    /// budget.
    NotFound,
}

/// One cached resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: ArtistStatus,
    pub resolved_at: DateTime<Utc>,
}

/// Durable artist resolution cache.
#[derive(Debug)]
pub struct ArtistCache {
    path: PathBuf,
    records: HashMap<String, ArtistRecord>,
}

impl ArtistCache {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(CACHE_FILE);

        let mut records = HashMap::new();
        match std::fs::File::open(&path) {
            Ok(file) => {
                for (line_no, line) in BufReader::new(file).lines().enumerate() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Artist cache truncated");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ArtistRecord>(&line) {
                        Ok(record) => {
                            // Last record for a name wins.
                            records.insert(record.name.clone(), record);
                        }
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                line = line_no + 1,
                                error = %e,
                                "Skipping corrupt artist record"
                            );
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Artist cache unreadable, starting empty");
            }
        }

        debug!(path = %path.display(), records = records.len(), "Opened artist cache");
        Ok(Self { path, records })
    }

    pub fn get(&self, name: &str) -> Option<&ArtistRecord> {
        self.records.get(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records a resolution durably before returning.
    pub fn put(&mut self, record: ArtistRecord) -> Result<()> {
        let line = serde_json::to_string(&record)?;
        let mut file = std::fs::File::options()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_data().map_err(|e| {
            ReconcileError::Persist(format!(
                "failed to sync artist cache {}: {}",
                self.path.display(),
                e
            ))
        })?;
        self.records.insert(record.name.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolved(name: &str, id: &str) -> ArtistRecord {
        ArtistRecord {
            name: name.to_string(),
            status: ArtistStatus::Resolved {
                remote_id: id.to_string(),
            },
            resolved_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_roundtrip_and_last_wins() {
        let dir = TempDir::new().unwrap();
        let mut cache = ArtistCache::open(dir.path()).unwrap();
        cache.put(resolved("Asha", "mbid-1")).unwrap();
        cache
            .put(ArtistRecord {
                name: "Beryl".to_string(),
                status: ArtistStatus::NotFound,
                resolved_at: DateTime::<Utc>::UNIX_EPOCH,
            })
            .unwrap();
        // Re-resolve Asha; the newer record should win after reopen.
        cache.put(resolved("Asha", "mbid-2")).unwrap();

        let cache = ArtistCache::open(dir.path()).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("Asha").unwrap().status,
            ArtistStatus::Resolved {
                remote_id: "mbid-2".to_string()
            }
        );
        assert_eq!(cache.get("Beryl").unwrap().status, ArtistStatus::NotFound);
        assert!(cache.get("Cleo").is_none());
    }

    #[test]
    fn test_status_serialization_shape() {
        let json = serde_json::to_value(&resolved("Asha", "mbid-1")).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["remote_id"], "mbid-1");
    }
}
