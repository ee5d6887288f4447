//! # Reconcile Module
//!
//! Rate-governed reconciliation of the scanned library against a remote
//! music catalog, with durable dedup of everything already announced.
//!
//! ## Components
//!
//! - **Rate Gate** (`rate_gate`): single serialization point enforcing the
//!   remote's minimum call interval
//! - **Release Ledger** (`ledger`): append-only known-release store, the
//!   dedup boundary for announcements
//! - **Artist Cache** (`artists`): durable name -> remote identity map,
//!   negative answers included
//! - **Reconciler** (`reconciler`): the two-phase pass (resolve artists,
//!   then list and announce watched releases)
//! - **Notifier** (`notifier`): best-effort companion search dispatch for
//!   each new release

pub mod artists;
pub mod error;
pub mod ledger;
pub mod notifier;
pub mod rate_gate;
pub mod reconciler;

pub use artists::{ArtistCache, ArtistRecord, ArtistStatus};
pub use error::{ReconcileError, Result};
pub use ledger::{LedgerEntry, ReleaseLedger};
pub use notifier::CompanionNotifier;
pub use rate_gate::RateGate;
pub use reconciler::{CatalogReconciler, ReconcileSummary};
