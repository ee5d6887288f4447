//! # Configuration
//!
//! Builder for [`WatchConfig`], the bundle of capabilities and tunables the
//! core workers are constructed from. Validation is fail-fast: a missing
//! required capability produces an actionable error at build time instead
//! of a panic deep inside a worker.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::WatchConfig;
//! use std::sync::Arc;
//!
//! let config = WatchConfig::builder()
//!     .library_root("/music")
//!     .data_dir("/home/user/.local/share/tunewatch")
//!     .catalog(Arc::new(my_catalog))
//!     .credentials(Arc::new(my_credentials))
//!     .build()?;
//! ```

use bridge_traits::{
    catalog::RemoteCatalog, companion::CompanionClient, companion::NoopCompanion,
    credentials::CredentialStore, time::Clock, time::SystemClock,
};
use core_metadata::extractor::{LoftyTagReader, TagReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default number of files between checkpoints.
const DEFAULT_CHECKPOINT_EVERY: usize = 25;

/// Default minimum interval between remote calls (the external API's
/// documented limit).
const DEFAULT_MIN_CALL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default per-call retry budget for transient remote failures.
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default per-remote-call timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Capabilities and tunables for the Tunewatch core.
#[derive(Clone)]
pub struct WatchConfig {
    /// Root of the music library to scan.
    pub library_root: PathBuf,

    /// Directory for cross-run state not tied to a library root (release
    /// ledger, artist cache).
    pub data_dir: PathBuf,

    /// Remote catalog capability.
    pub catalog: Arc<dyn RemoteCatalog>,

    /// Bearer credential capability.
    pub credentials: Arc<dyn CredentialStore>,

    /// Companion search client (no-op when the host found none).
    pub companion: Arc<dyn CompanionClient>,

    /// Tag extraction capability.
    pub tag_reader: Arc<dyn TagReader>,

    /// Time source.
    pub clock: Arc<dyn Clock>,

    /// Files processed between durable checkpoints.
    pub checkpoint_every: usize,

    /// Minimum interval enforced between any two remote calls.
    pub min_call_interval: Duration,

    /// Bounded retry attempts for transient remote failures.
    pub retry_attempts: u32,

    /// Timeout the reconciler enforces around each remote catalog call.
    /// Connectors typically apply the same bound at the HTTP layer.
    pub request_timeout: Duration,
}

impl WatchConfig {
    pub fn builder() -> WatchConfigBuilder {
        WatchConfigBuilder::default()
    }
}

impl std::fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchConfig")
            .field("library_root", &self.library_root)
            .field("data_dir", &self.data_dir)
            .field("checkpoint_every", &self.checkpoint_every)
            .field("min_call_interval", &self.min_call_interval)
            .field("retry_attempts", &self.retry_attempts)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WatchConfig`].
#[derive(Default)]
pub struct WatchConfigBuilder {
    library_root: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    catalog: Option<Arc<dyn RemoteCatalog>>,
    credentials: Option<Arc<dyn CredentialStore>>,
    companion: Option<Arc<dyn CompanionClient>>,
    tag_reader: Option<Arc<dyn TagReader>>,
    clock: Option<Arc<dyn Clock>>,
    checkpoint_every: Option<usize>,
    min_call_interval: Option<Duration>,
    retry_attempts: Option<u32>,
    request_timeout: Option<Duration>,
}

impl WatchConfigBuilder {
    pub fn library_root(mut self, path: impl AsRef<Path>) -> Self {
        self.library_root = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn RemoteCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn companion(mut self, companion: Arc<dyn CompanionClient>) -> Self {
        self.companion = Some(companion);
        self
    }

    pub fn tag_reader(mut self, tag_reader: Arc<dyn TagReader>) -> Self {
        self.tag_reader = Some(tag_reader);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn checkpoint_every(mut self, files: usize) -> Self {
        self.checkpoint_every = Some(files);
        self
    }

    pub fn min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = Some(interval);
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<WatchConfig> {
        let library_root = self
            .library_root
            .ok_or_else(|| Error::Config("library_root is required".to_string()))?;

        let data_dir = self
            .data_dir
            .ok_or_else(|| Error::Config("data_dir is required".to_string()))?;

        let catalog = self.catalog.ok_or_else(|| Error::CapabilityMissing {
            capability: "RemoteCatalog".to_string(),
            message: "No remote catalog implementation provided. \
                      Wire provider-musicbrainz or a custom implementation."
                .to_string(),
        })?;

        let credentials = self.credentials.ok_or_else(|| Error::CapabilityMissing {
            capability: "CredentialStore".to_string(),
            message: "No credential store provided. \
                      Use StaticCredentialStore::empty() for an unauthenticated setup."
                .to_string(),
        })?;

        let checkpoint_every = self.checkpoint_every.unwrap_or(DEFAULT_CHECKPOINT_EVERY);
        if checkpoint_every == 0 {
            return Err(Error::Config(
                "checkpoint_every must be at least 1".to_string(),
            ));
        }

        Ok(WatchConfig {
            library_root,
            data_dir,
            catalog,
            credentials,
            companion: self.companion.unwrap_or_else(|| Arc::new(NoopCompanion)),
            tag_reader: self
                .tag_reader
                .unwrap_or_else(|| Arc::new(LoftyTagReader::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            checkpoint_every,
            min_call_interval: self.min_call_interval.unwrap_or(DEFAULT_MIN_CALL_INTERVAL),
            retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }
}
