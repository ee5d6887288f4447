use thiserror::Error;

/// Errors produced by the reconcile subsystem.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("No bearer credential available, reconciliation pass skipped")]
    NotAuthenticated,

    #[error(transparent)]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Failed to persist reconcile state: {0}")]
    Persist(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
