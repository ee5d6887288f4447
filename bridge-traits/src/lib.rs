//! # Capability Traits
//!
//! Contracts between the Tunewatch core and everything it consumes from the
//! outside world. Each trait is a capability the core requires but does not
//! implement itself:
//!
//! - [`RemoteCatalog`](catalog::RemoteCatalog) - artist lookup and release
//!   listing against a remote music catalog
//! - [`CredentialStore`](credentials::CredentialStore) - bearer-token access
//!   (the login flow itself lives outside the core)
//! - [`CompanionClient`](companion::CompanionClient) - best-effort search
//!   dispatch to a locally running P2P client
//! - [`Clock`](time::Clock) - injectable time source for deterministic tests
//!
//! ## Error Handling
//!
//! All capability traits report failures through [`BridgeError`]. The core
//! decides policy: transport errors are retried with backoff, auth errors
//! abort a reconciliation pass, companion failures are logged and ignored.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync` so capabilities can be shared across
//! async tasks behind `Arc<dyn _>`.

pub mod catalog;
pub mod companion;
pub mod credentials;
pub mod error;
pub mod time;

pub use error::BridgeError;

pub use catalog::{ArtistMatch, ReleaseKind, RemoteCatalog, RemoteRelease};
pub use companion::{CommandCompanion, CompanionClient, NoopCompanion};
pub use credentials::{CredentialStore, StaticCredentialStore};
pub use time::{Clock, SystemClock};
