//! Credential Capability
//!
//! The core never performs a login flow; it only consumes the bearer token
//! the host obtained elsewhere (browser OAuth redirect, config file, ...).
//! An absent token is a valid state surfaced as "reconciliation
//! unavailable", not an error.

use async_trait::async_trait;

use crate::error::Result;

/// Bearer credential access.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current bearer token, or `None` when the user is not logged in.
    ///
    /// Implementations are responsible for refresh; a token returned here
    /// is expected to be usable for at least the next few minutes.
    async fn bearer_token(&self) -> Result<Option<String>>;
}

/// Fixed-token store for tests and host setups that manage the token
/// externally.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    token: Option<String>,
}

impl StaticCredentialStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A store with no credential, i.e. "not logged in".
    pub fn empty() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_store() {
        let store = StaticCredentialStore::new("tok-123");
        assert_eq!(store.bearer_token().await.unwrap().as_deref(), Some("tok-123"));

        let empty = StaticCredentialStore::empty();
        assert_eq!(empty.bearer_token().await.unwrap(), None);
    }
}
