use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the scan subsystem.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Library root not accessible: {0}")]
    RootUnavailable(PathBuf),

    #[error("Failed to persist scan state: {0}")]
    Persist(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
