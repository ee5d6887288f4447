//! Remote Catalog Capability
//!
//! Contract for the remote music catalog the reconciler resolves artists
//! against. Implementations (e.g. the MusicBrainz provider) perform the
//! actual network calls; the core guarantees at least the configured
//! minimum interval between any two calls via its rate gate, so
//! implementations must not add their own request pacing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Release group classification as reported by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseKind {
    Album,
    Ep,
    Single,
    /// Compilations, live albums, and anything else the remote reports.
    Other,
}

impl ReleaseKind {
    /// Kinds the reconciler surfaces to the user.
    pub fn is_watched(&self) -> bool {
        matches!(self, Self::Album | Self::Ep)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Ep => "ep",
            Self::Single => "single",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate from an artist-by-name search, in the remote's own
/// relevance ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistMatch {
    /// Remote catalog identifier
    pub id: String,
    /// Artist name as the remote knows it
    pub name: String,
    /// Relevance score (0-100) assigned by the remote, if reported
    pub score: Option<u8>,
}

/// One release entry returned by a release listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRelease {
    /// Remote release identifier
    pub id: String,
    /// Release title
    pub title: String,
    /// First release date as reported (`YYYY-MM-DD`, possibly partial)
    pub date: Option<String>,
    /// Release classification
    pub kind: ReleaseKind,
}

/// Remote catalog lookup capability.
///
/// # Rate contract
///
/// Callers guarantee >= the remote's documented minimum interval between
/// any two invocations of either method. Implementations translate
/// failures into [`BridgeError`](crate::BridgeError): network and timeout
/// conditions become `Transport`/`Timeout` (transient, retried by the
/// caller), credential rejections become `Auth` (aborts the pass).
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Search artists by name, ordered by the remote's relevance ranking.
    ///
    /// An empty result is a valid answer, not an error.
    async fn search_artist(&self, name: &str) -> Result<Vec<ArtistMatch>>;

    /// List releases of the given kinds for a resolved artist identity.
    ///
    /// Implementations may return a superset of `kinds`; callers filter
    /// defensively.
    async fn list_releases(&self, artist_id: &str, kinds: &[ReleaseKind])
        -> Result<Vec<RemoteRelease>>;
}
