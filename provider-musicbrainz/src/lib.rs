//! # MusicBrainz Provider
//!
//! [`RemoteCatalog`](bridge_traits::catalog::RemoteCatalog) implementation
//! backed by the MusicBrainz JSON web service: artist search via Lucene
//! query, release listing via release-group browse.
//!
//! The connector is transport only. Retry, rate pacing, and dedup all live
//! in the core; MusicBrainz's one-request-per-second rule is enforced by
//! the caller's rate gate.

pub mod connector;
pub mod types;

pub use connector::MusicBrainzConnector;
