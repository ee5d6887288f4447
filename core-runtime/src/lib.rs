//! # Runtime Module
//!
//! Shared runtime plumbing for the Tunewatch core:
//!
//! - **Events** (`events`): broadcast channel carrying scan and
//!   reconciliation events to the presentation side, the only way any
//!   front end observes the core
//! - **Configuration** (`config`): [`WatchConfig`] builder with fail-fast
//!   validation of required capabilities
//! - **Logging** (`logging`): `tracing-subscriber` bootstrap

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{WatchConfig, WatchConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, ReconcileEvent, ScanEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
