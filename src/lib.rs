//! Workspace facade crate.
//!
//! This crate exists to expose shared feature flags that map to the
//! individual workspace crates (`core-scan`, `core-reconcile`,
//! `provider-musicbrainz`). Host applications can depend on `tunewatch`
//! and enable the documented features without wiring each crate
//! individually.

#[cfg(feature = "reconcile")]
pub use core_reconcile as reconcile;
#[cfg(any(feature = "scan", feature = "reconcile"))]
pub use core_runtime as runtime;
#[cfg(feature = "scan")]
pub use core_scan as scan;
#[cfg(feature = "musicbrainz")]
pub use provider_musicbrainz as musicbrainz;
