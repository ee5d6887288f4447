//! # Catalog Reconciler
//!
//! Two-phase reconciliation of the scanned library against the remote
//! catalog.
//!
//! ## Overview
//!
//! Phase 1 resolves every indexed artist name to a remote identity,
//! consulting the durable [`ArtistCache`] first so previously answered
//! names cost no rate budget. Phase 2 lists watched releases (albums and
//! EPs) for each resolved artist and announces the ones not yet in the
//! [`ReleaseLedger`]. The ledger write is synced before the announcement
//! is emitted, so a crash never causes a duplicate announcement.
//!
//! Every remote call passes through the [`RateGate`] and carries a bounded
//! retry budget for transient failures; a credential rejection aborts the
//! pass immediately. A pass without a bearer credential does not run at
//! all.

use bridge_traits::catalog::{ArtistMatch, ReleaseKind, RemoteCatalog, RemoteRelease};
use bridge_traits::credentials::CredentialStore;
use bridge_traits::time::Clock;
use bridge_traits::BridgeError;
use core_runtime::config::WatchConfig;
use core_runtime::events::{CoreEvent, EventBus, ReconcileEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::artists::{ArtistCache, ArtistRecord, ArtistStatus};
use crate::error::{ReconcileError, Result};
use crate::ledger::{LedgerEntry, ReleaseLedger};
use crate::notifier::CompanionNotifier;
use crate::rate_gate::RateGate;

/// Release kinds surfaced to the user.
const WATCHED_KINDS: &[ReleaseKind] = &[ReleaseKind::Album, ReleaseKind::Ep];

/// Base delay for the exponential retry backoff.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Counters for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub resolved: usize,
    pub not_found: usize,
    pub new_releases: usize,
}

/// Two-phase artist/release reconciler.
pub struct CatalogReconciler {
    catalog: Arc<dyn RemoteCatalog>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    gate: RateGate,
    notifier: CompanionNotifier,
    events: EventBus,
    retry_attempts: u32,
    request_timeout: Duration,
    ledger: ReleaseLedger,
    artists: ArtistCache,
}

impl CatalogReconciler {
    /// Builds a reconciler from the shared configuration, opening the
    /// ledger and artist cache under its data directory.
    pub fn new(config: &WatchConfig, events: EventBus) -> Result<Self> {
        Ok(Self {
            catalog: Arc::clone(&config.catalog),
            credentials: Arc::clone(&config.credentials),
            clock: Arc::clone(&config.clock),
            gate: RateGate::new(config.min_call_interval, Arc::clone(&config.clock)),
            notifier: CompanionNotifier::new(Arc::clone(&config.companion)),
            events,
            retry_attempts: config.retry_attempts.max(1),
            request_timeout: config.request_timeout,
            ledger: ReleaseLedger::open(&config.data_dir)?,
            artists: ArtistCache::open(&config.data_dir)?,
        })
    }

    fn emit(&self, event: ReconcileEvent) {
        self.events.emit(CoreEvent::Reconcile(event)).ok();
    }

    /// Runs one reconciliation pass over the given artist names.
    ///
    /// Skips entirely (with a [`ReconcileEvent::NotAuthenticated`] event)
    /// when no bearer credential is available.
    pub async fn run(&mut self, artist_names: &[String]) -> Result<ReconcileSummary> {
        if self.credentials.bearer_token().await?.is_none() {
            info!("No bearer credential, skipping reconciliation pass");
            self.emit(ReconcileEvent::NotAuthenticated);
            return Err(ReconcileError::NotAuthenticated);
        }

        info!(artists = artist_names.len(), "Reconciliation pass started");
        self.emit(ReconcileEvent::Started {
            artist_count: artist_names.len(),
        });

        match self.run_inner(artist_names).await {
            Ok(summary) => {
                info!(
                    resolved = summary.resolved,
                    not_found = summary.not_found,
                    new_releases = summary.new_releases,
                    "Reconciliation pass completed"
                );
                self.emit(ReconcileEvent::Completed {
                    resolved: summary.resolved,
                    not_found: summary.not_found,
                    new_releases: summary.new_releases,
                });
                Ok(summary)
            }
            Err(e) => {
                self.emit(ReconcileEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self, artist_names: &[String]) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        let mut resolved: Vec<(String, String)> = Vec::new();

        // Phase 1: resolve every artist name to a remote identity.
        for name in artist_names {
            match self.resolve_artist(name).await? {
                Some(remote_id) => {
                    summary.resolved += 1;
                    self.emit(ReconcileEvent::ArtistResolved {
                        name: name.clone(),
                        remote_id: remote_id.clone(),
                    });
                    resolved.push((name.clone(), remote_id));
                }
                None => {
                    summary.not_found += 1;
                    self.emit(ReconcileEvent::ArtistNotFound { name: name.clone() });
                }
            }
        }

        // Phase 2: list watched releases and announce the unseen ones.
        for (name, artist_id) in &resolved {
            let releases = match self.list_with_retry(artist_id).await {
                Ok(releases) => releases,
                Err(e) if e.is_transient() => {
                    warn!(artist = %name, error = %e, "Release listing unreachable, skipping artist this pass");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            for release in releases {
                // Remotes may return a superset of the requested kinds.
                if !release.kind.is_watched() {
                    continue;
                }
                if self.ledger.contains(&release.id) {
                    continue;
                }
                self.announce(name, release).await?;
                summary.new_releases += 1;
            }
        }

        Ok(summary)
    }

    /// Resolves one artist name, consulting the cache first. Returns the
    /// remote id, or `None` for a (possibly cached) negative answer.
    async fn resolve_artist(&mut self, name: &str) -> Result<Option<String>> {
        if let Some(record) = self.artists.get(name) {
            debug!(artist = name, "Artist resolution cache hit");
            return Ok(match &record.status {
                ArtistStatus::Resolved { remote_id } => Some(remote_id.clone()),
                ArtistStatus::NotFound => None,
            });
        }

        let status = match self.search_with_retry(name).await {
            Ok(matches) => match best_match(name, matches) {
                Some(m) => {
                    debug!(artist = name, remote_id = %m.id, score = ?m.score, "Artist resolved");
                    ArtistStatus::Resolved { remote_id: m.id }
                }
                None => {
                    debug!(artist = name, "No remote match for artist");
                    ArtistStatus::NotFound
                }
            },
            Err(e) if e.is_transient() => {
                // Retry budget exhausted; cache the negative so later
                // passes do not re-spend rate budget on it.
                warn!(artist = name, error = %e, "Artist unreachable past retry budget, recording as not found");
                ArtistStatus::NotFound
            }
            Err(e) => return Err(e.into()),
        };

        let record = ArtistRecord {
            name: name.to_string(),
            status: status.clone(),
            resolved_at: self.clock.now(),
        };
        self.artists.put(record)?;

        Ok(match status {
            ArtistStatus::Resolved { remote_id } => Some(remote_id),
            ArtistStatus::NotFound => None,
        })
    }

    /// Writes the ledger entry, then emits and dispatches the
    /// announcement. Ordering matters: a crash after the sync produces a
    /// missed announcement at worst, never a duplicate.
    async fn announce(&mut self, artist: &str, release: RemoteRelease) -> Result<()> {
        self.ledger.add(LedgerEntry {
            release_id: release.id.clone(),
            artist: artist.to_string(),
            title: release.title.clone(),
            date: release.date.clone(),
            kind: release.kind,
            first_seen: self.clock.now(),
        })?;

        info!(artist, title = %release.title, kind = %release.kind, "New release discovered");
        self.emit(ReconcileEvent::NewRelease {
            release_id: release.id,
            artist: artist.to_string(),
            title: release.title.clone(),
            date: release.date,
            kind: release.kind,
        });

        self.notifier.notify_new_release(artist, &release.title).await;
        Ok(())
    }

    /// Bounds a catalog call with the configured request timeout. Connectors
    /// usually enforce their own deadline too; this one catches the ones
    /// that stall anyway, and a timeout counts as transient for retry.
    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = std::result::Result<T, BridgeError>>,
    ) -> std::result::Result<T, BridgeError> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout(self.request_timeout.as_secs())),
        }
    }

    async fn search_with_retry(
        &self,
        name: &str,
    ) -> std::result::Result<Vec<ArtistMatch>, BridgeError> {
        let mut attempt = 0u32;
        loop {
            self.gate.acquire().await;
            match self.bounded(self.catalog.search_artist(name)).await {
                Ok(matches) => return Ok(matches),
                Err(e) if e.is_transient() && attempt + 1 < self.retry_attempts => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    warn!(artist = name, error = %e, attempt, "Artist search failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list_with_retry(
        &self,
        artist_id: &str,
    ) -> std::result::Result<Vec<RemoteRelease>, BridgeError> {
        let mut attempt = 0u32;
        loop {
            self.gate.acquire().await;
            match self
                .bounded(self.catalog.list_releases(artist_id, WATCHED_KINDS))
                .await
            {
                Ok(releases) => return Ok(releases),
                Err(e) if e.is_transient() && attempt + 1 < self.retry_attempts => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    warn!(artist_id, error = %e, attempt, "Release listing failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// An exact case-insensitive name match wins outright; otherwise the
/// highest-scored result, with ties and unscored results falling back to
/// the remote's own relevance ordering.
fn best_match(name: &str, matches: Vec<ArtistMatch>) -> Option<ArtistMatch> {
    let wanted = name.to_lowercase();
    if let Some(i) = matches.iter().position(|m| m.name.to_lowercase() == wanted) {
        return matches.into_iter().nth(i);
    }
    matches
        .into_iter()
        .enumerate()
        .max_by_key(|(i, m)| (m.score.unwrap_or(0), std::cmp::Reverse(*i)))
        .map(|(_, m)| m)
}
