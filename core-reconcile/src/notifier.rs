//! # Companion Notifier
//!
//! Forwards each newly discovered release to the companion P2P client as a
//! plain `"<artist> <title>"` search. Strictly best-effort: an unavailable
//! or failing client is logged and forgotten, and never affects the
//! reconciliation result or the ledger.

use bridge_traits::companion::CompanionClient;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CompanionNotifier {
    companion: Arc<dyn CompanionClient>,
}

impl CompanionNotifier {
    pub fn new(companion: Arc<dyn CompanionClient>) -> Self {
        Self { companion }
    }

    /// Dispatches a search for a new release. Never fails.
    pub async fn notify_new_release(&self, artist: &str, title: &str) {
        if !self.companion.is_available() {
            debug!(artist, title, "No companion client, skipping search dispatch");
            return;
        }

        let query = format!("{} {}", artist, title);
        if let Err(e) = self.companion.search(&query).await {
            warn!(query, error = %e, "Companion search dispatch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::companion::NoopCompanion;
    use bridge_traits::error::BridgeError;
    use std::sync::Mutex;

    struct RecordingCompanion {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CompanionClient for RecordingCompanion {
        fn is_available(&self) -> bool {
            true
        }

        async fn search(&self, query: &str) -> bridge_traits::error::Result<()> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                Err(BridgeError::OperationFailed("spawn failed".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_query_format() {
        let companion = Arc::new(RecordingCompanion {
            queries: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = CompanionNotifier::new(companion.clone());

        notifier.notify_new_release("Asha", "First Light").await;
        assert_eq!(
            companion.queries.lock().unwrap().as_slice(),
            &["Asha First Light".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let companion = Arc::new(RecordingCompanion {
            queries: Mutex::new(Vec::new()),
            fail: true,
        });
        CompanionNotifier::new(companion)
            .notify_new_release("Asha", "First Light")
            .await;
    }

    #[tokio::test]
    async fn test_unavailable_client_is_skipped() {
        CompanionNotifier::new(Arc::new(NoopCompanion))
            .notify_new_release("Asha", "First Light")
            .await;
    }
}
