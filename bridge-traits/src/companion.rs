//! Companion Application Capability
//!
//! Best-effort search dispatch to a locally discovered P2P client
//! (Nicotine+, SoulseekQt, ...). Discovery and launch policy live on the
//! host side; the core only needs "is one available" and "send this query".
//! Failures here never affect scan or reconciliation results.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};

/// Companion search client capability.
#[async_trait]
pub trait CompanionClient: Send + Sync {
    /// Whether a client is currently configured and launchable.
    fn is_available(&self) -> bool;

    /// Dispatch a search query to the client.
    async fn search(&self, query: &str) -> Result<()>;
}

/// Documented no-op default: reports unavailable, drops every query.
#[derive(Debug, Clone, Default)]
pub struct NoopCompanion;

#[async_trait]
impl CompanionClient for NoopCompanion {
    fn is_available(&self) -> bool {
        false
    }

    async fn search(&self, _query: &str) -> Result<()> {
        Err(BridgeError::NotAvailable(
            "no companion client configured".to_string(),
        ))
    }
}

/// Spawns a configured executable with a search flag, e.g.
/// `nicotine --search "<query>"`.
///
/// Launch is fire-and-forget: the child is detached and its exit status is
/// not awaited.
#[derive(Debug, Clone)]
pub struct CommandCompanion {
    program: PathBuf,
    search_flag: String,
}

impl CommandCompanion {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            search_flag: "--search".to_string(),
        }
    }

    pub fn with_search_flag(mut self, flag: impl Into<String>) -> Self {
        self.search_flag = flag.into();
        self
    }
}

#[async_trait]
impl CompanionClient for CommandCompanion {
    fn is_available(&self) -> bool {
        self.program.is_file()
    }

    async fn search(&self, query: &str) -> Result<()> {
        if !self.is_available() {
            return Err(BridgeError::NotAvailable(format!(
                "companion executable not found: {}",
                self.program.display()
            )));
        }

        debug!(program = %self.program.display(), query, "Launching companion search");

        Command::new(&self.program)
            .arg(&self.search_flag)
            .arg(query)
            .spawn()
            .map_err(|e| {
                BridgeError::OperationFailed(format!(
                    "failed to launch {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        info!(program = %self.program.display(), "Companion search dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_is_unavailable() {
        let companion = NoopCompanion;
        assert!(!companion.is_available());
        assert!(companion.search("Artist Album").await.is_err());
    }

    #[tokio::test]
    async fn test_command_companion_missing_executable() {
        let companion = CommandCompanion::new("/nonexistent/client");
        assert!(!companion.is_available());

        let err = companion.search("Artist Album").await.unwrap_err();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }
}
