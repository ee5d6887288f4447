//! MusicBrainz connector implementing the [`RemoteCatalog`] capability.
//!
//! Pure transport: queries the JSON web service, translates failures into
//! [`BridgeError`], and maps wire types onto the catalog model. Request
//! pacing is the caller's job per the `RemoteCatalog` rate contract;
//! MusicBrainz documents one request per second.

use async_trait::async_trait;
use bridge_traits::catalog::{ArtistMatch, ReleaseKind, RemoteCatalog, RemoteRelease};
use bridge_traits::credentials::CredentialStore;
use bridge_traits::error::{BridgeError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::types::{ArtistSearchResponse, ReleaseGroupBrowseResponse};

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz rejects requests without an identifying User-Agent.
const USER_AGENT: &str = concat!("tunewatch/", env!("CARGO_PKG_VERSION"));

/// Cap per the web service's maximum page size.
const BROWSE_LIMIT: u32 = 100;

const SEARCH_LIMIT: u32 = 10;

/// HTTP connector for the MusicBrainz web service.
pub struct MusicBrainzConnector {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    timeout: Duration,
}

impl MusicBrainzConnector {
    /// `timeout` bounds each request; hosts typically pass the
    /// `request_timeout` they also hand to the core configuration.
    pub fn new(credentials: Arc<dyn CredentialStore>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            timeout,
        })
    }

    /// Point at a different endpoint, e.g. a mirror or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "MusicBrainz request");

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = self.credentials.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BridgeError::Timeout(self.timeout.as_secs())
            } else {
                BridgeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BridgeError::Auth(format!(
                "MusicBrainz rejected credentials: {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(BridgeError::Transport(format!(
                "MusicBrainz returned {}",
                status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BridgeError::Decode(e.to_string()))
    }
}

/// Lucene query with the name quoted so punctuation in artist names is
/// matched literally.
fn artist_query(name: &str) -> String {
    format!("artist:\"{}\"", name.replace('"', "\\\""))
}

/// `type=` filter value for a set of kinds, e.g. `album|ep`. `Other` has
/// no wire representation and is dropped.
fn type_param(kinds: &[ReleaseKind]) -> String {
    kinds
        .iter()
        .filter_map(|kind| match kind {
            ReleaseKind::Album => Some("album"),
            ReleaseKind::Ep => Some("ep"),
            ReleaseKind::Single => Some("single"),
            ReleaseKind::Other => None,
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[async_trait]
impl RemoteCatalog for MusicBrainzConnector {
    async fn search_artist(&self, name: &str) -> Result<Vec<ArtistMatch>> {
        let response: ArtistSearchResponse = self
            .get_json(
                "artist",
                &[
                    ("query", artist_query(name)),
                    ("fmt", "json".to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;

        debug!(artist = name, matches = response.artists.len(), "Artist search done");

        Ok(response
            .artists
            .into_iter()
            .map(|entry| ArtistMatch {
                id: entry.id,
                name: entry.name,
                score: entry.score,
            })
            .collect())
    }

    async fn list_releases(
        &self,
        artist_id: &str,
        kinds: &[ReleaseKind],
    ) -> Result<Vec<RemoteRelease>> {
        let response: ReleaseGroupBrowseResponse = self
            .get_json(
                "release-group",
                &[
                    ("artist", artist_id.to_string()),
                    ("type", type_param(kinds)),
                    ("fmt", "json".to_string()),
                    ("limit", BROWSE_LIMIT.to_string()),
                ],
            )
            .await?;

        debug!(
            artist_id,
            groups = response.release_groups.len(),
            "Release group browse done"
        );

        Ok(response
            .release_groups
            .into_iter()
            .map(|entry| RemoteRelease {
                id: entry.id.clone(),
                title: entry.title.clone(),
                date: entry.date(),
                kind: entry.kind(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::credentials::StaticCredentialStore;

    #[test]
    fn test_artist_query_quoting() {
        assert_eq!(artist_query("Asha"), r#"artist:"Asha""#);
        assert_eq!(
            artist_query(r#"The "Band""#),
            r#"artist:"The \"Band\"""#
        );
    }

    #[test]
    fn test_type_param() {
        assert_eq!(
            type_param(&[ReleaseKind::Album, ReleaseKind::Ep]),
            "album|ep"
        );
        assert_eq!(type_param(&[ReleaseKind::Single]), "single");
        assert_eq!(type_param(&[ReleaseKind::Other]), "");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let connector = MusicBrainzConnector::new(
            Arc::new(StaticCredentialStore::empty()),
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url("http://127.0.0.1:1/ws/2");

        let err = connector.search_artist("Asha").await.unwrap_err();
        assert!(matches!(err, BridgeError::Transport(_)));
        assert!(err.is_transient());
    }
}
