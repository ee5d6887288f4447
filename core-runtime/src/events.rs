//! # Event Bus
//!
//! Broadcast channel connecting the core's background workers to any
//! presentation layer. The walker and the reconciler emit typed events;
//! subscribers render them however they like (TUI, GUI, log tail). No
//! shared mutable state crosses this boundary.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, ScanEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Scan(ScanEvent::Progress {
//!     processed: 10,
//!     total: 420,
//! }))
//! .ok();
//!
//! if let Ok(CoreEvent::Scan(ScanEvent::Progress { processed, .. })) = rx.recv().await {
//!     assert_eq!(processed, 10);
//! }
//! # }
//! ```

use bridge_traits::catalog::ReleaseKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::SendError, Receiver, Sender};

/// Default buffer size per subscriber.
const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Events emitted by the library walker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ScanEvent {
    /// Enumeration finished, processing begins.
    Started {
        /// Number of eligible files in the sorted listing.
        total: usize,
        /// Index the walk resumes from (0 for a fresh walk).
        resumed_from: usize,
    },
    /// One file fully processed.
    Progress { processed: usize, total: usize },
    /// A file was recorded with an error annotation and skipped or
    /// partially processed; the scan continues.
    FileError { path: PathBuf, message: String },
    /// Cursor and fingerprint store were persisted.
    Checkpoint { processed: usize },
    /// Stop honored at a file boundary; cursor reflects the last fully
    /// completed file.
    Paused { processed: usize, total: usize },
    /// Walk completed; cursor cleared.
    Completed { processed: usize, error_count: usize },
    /// Unrecoverable I/O (e.g. library root vanished).
    Failed { message: String },
}

/// Events emitted by the catalog reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReconcileEvent {
    /// Reconciliation pass started.
    Started { artist_count: usize },
    /// Phase 1: artist resolved to a remote identity.
    ArtistResolved { name: String, remote_id: String },
    /// Phase 1: artist could not be resolved (no match, or transport
    /// failures exhausted the retry budget).
    ArtistNotFound { name: String },
    /// Phase 2: a release not previously in the ledger. Emitted only
    /// after the ledger write succeeded.
    NewRelease {
        release_id: String,
        artist: String,
        title: String,
        date: Option<String>,
        kind: ReleaseKind,
    },
    /// No bearer credential available; the pass did not run.
    NotAuthenticated,
    /// Pass finished.
    Completed {
        resolved: usize,
        not_found: usize,
        new_releases: usize,
    },
    /// Pass aborted (auth failure mid-run, store corruption).
    Failed { message: String },
}

/// Top-level event type carried on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CoreEvent {
    Scan(ScanEvent),
    Reconcile(ReconcileEvent),
}

/// Central broadcast channel for core events.
///
/// Cloning is cheap; every subscriber receives all events emitted after it
/// subscribed. Slow subscribers observe `RecvError::Lagged` rather than
/// blocking the workers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none. Workers treat "no subscribers" as
    /// non-fatal and drop the event.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates an independent receiver for all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let sent = bus
            .emit(CoreEvent::Scan(ScanEvent::Progress {
                processed: 1,
                total: 2,
            }))
            .unwrap();
        assert_eq!(sent, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Scan(ScanEvent::Progress {
                processed: 1,
                total: 2
            })
        );
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_fails_softly() {
        let bus = EventBus::new(8);
        assert!(bus
            .emit(CoreEvent::Reconcile(ReconcileEvent::NotAuthenticated))
            .is_err());
    }

    #[tokio::test]
    async fn test_independent_subscribers() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(CoreEvent::Scan(ScanEvent::Started {
            total: 5,
            resumed_from: 0,
        }))
        .unwrap();

        assert!(matches!(
            a.recv().await.unwrap(),
            CoreEvent::Scan(ScanEvent::Started { total: 5, .. })
        ));
        assert!(matches!(
            b.recv().await.unwrap(),
            CoreEvent::Scan(ScanEvent::Started { total: 5, .. })
        ));
    }
}
