//! Wire types for the MusicBrainz JSON web service.

use bridge_traits::catalog::ReleaseKind;
use serde::Deserialize;

/// Response of `GET /ws/2/artist?query=...`.
#[derive(Debug, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artists: Vec<ArtistEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistEntry {
    pub id: String,
    pub name: String,
    /// Search relevance 0-100, present on search results only.
    pub score: Option<u8>,
}

/// Response of `GET /ws/2/release-group?artist=...`.
#[derive(Debug, Deserialize)]
pub struct ReleaseGroupBrowseResponse {
    #[serde(rename = "release-groups", default)]
    pub release_groups: Vec<ReleaseGroupEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseGroupEntry {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`, possibly truncated to year or year-month. Absent or
    /// empty when MusicBrainz has no date.
    #[serde(rename = "first-release-date")]
    pub first_release_date: Option<String>,
    #[serde(rename = "primary-type")]
    pub primary_type: Option<String>,
}

impl ReleaseGroupEntry {
    /// Maps MusicBrainz's primary type onto [`ReleaseKind`]. Secondary
    /// types (live, compilation) are not consulted; anything unrecognized
    /// is `Other` and gets filtered by the caller.
    pub fn kind(&self) -> ReleaseKind {
        match self.primary_type.as_deref() {
            Some("Album") => ReleaseKind::Album,
            Some("EP") => ReleaseKind::Ep,
            Some("Single") => ReleaseKind::Single,
            _ => ReleaseKind::Other,
        }
    }

    /// Release date with empty strings collapsed to `None`.
    pub fn date(&self) -> Option<String> {
        self.first_release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(String::from)
    }
}
