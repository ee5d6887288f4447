//! # Scan Cursor
//!
//! Durable traversal position for the library walker. The cursor records
//! how far a walk over the sorted file listing got and how many eligible
//! files that listing contained; a listing of a different length on the
//! next run marks the cursor stale and forces a fresh walk, because index
//! positions would no longer line up with the same files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::fingerprint::CONTROL_DIR;

const CURSOR_FILE: &str = "cursor.json";

/// Position within a sorted file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
    /// Index of the next file to process.
    pub next_index: usize,
    /// Length of the listing the cursor was taken against.
    pub total_files: usize,
    /// Whether the walk ran to completion.
    pub completed: bool,
}

impl ScanCursor {
    /// A cursor is stale when the current listing length differs from the
    /// one it was recorded against.
    pub fn is_stale(&self, listing_len: usize) -> bool {
        self.total_files != listing_len
    }
}

/// Loads and saves the cursor under the library's control directory.
///
/// Saves go through a temp file and rename so a crash mid-write leaves the
/// previous cursor intact; the rename is the commit point of a checkpoint.
#[derive(Debug)]
pub struct CursorStore {
    cursor_path: PathBuf,
}

impl CursorStore {
    pub fn new(library_root: &Path) -> Self {
        Self {
            cursor_path: library_root.join(CONTROL_DIR).join(CURSOR_FILE),
        }
    }

    /// Loads the persisted cursor, if any. An unreadable or unparsable
    /// cursor is treated as absent.
    pub fn load(&self) -> Option<ScanCursor> {
        let data = std::fs::read_to_string(&self.cursor_path).ok()?;
        match serde_json::from_str(&data) {
            Ok(cursor) => Some(cursor),
            Err(e) => {
                tracing::warn!(
                    path = %self.cursor_path.display(),
                    error = %e,
                    "Cursor unparsable, starting a fresh walk"
                );
                None
            }
        }
    }

    pub fn save(&self, cursor: &ScanCursor) -> Result<()> {
        if let Some(parent) = self.cursor_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.cursor_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(cursor)?)?;
        std::fs::rename(&tmp_path, &self.cursor_path).map_err(|e| {
            ScanError::Persist(format!(
                "failed to commit cursor {}: {}",
                self.cursor_path.display(),
                e
            ))
        })?;
        debug!(next_index = cursor.next_index, total = cursor.total_files, "Saved cursor");
        Ok(())
    }

    /// Removes the cursor. Absence is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.cursor_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = CursorStore::new(dir.path());
        assert!(store.load().is_none());

        let cursor = ScanCursor {
            next_index: 42,
            total_files: 100,
            completed: false,
        };
        store.save(&cursor).unwrap();
        assert_eq!(store.load(), Some(cursor));

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_staleness() {
        let cursor = ScanCursor {
            next_index: 10,
            total_files: 50,
            completed: false,
        };
        assert!(!cursor.is_stale(50));
        assert!(cursor.is_stale(49));
        assert!(cursor.is_stale(51));
    }

    #[test]
    fn test_garbage_cursor_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let control = dir.path().join(CONTROL_DIR);
        std::fs::create_dir_all(&control).unwrap();
        std::fs::write(control.join(CURSOR_FILE), "{oops").unwrap();

        let store = CursorStore::new(dir.path());
        assert!(store.load().is_none());
    }
}
