//! LightBeat Sync
//!
//! Playback-synchronization engine: keeps a per-track timer loop aligned
//! with the streaming service's real-time playback position and emits one
//! trigger per beat/bar boundary.
//!
//! # Components
//!
//! - **Change Detector** (`ChangeDetector`): decides from two consecutive
//!   snapshots whether the running session must be stopped and/or a new one
//!   started
//! - **Marker Locator** (`locate`): finds the marker interval in progress and
//!   the time until the next boundary
//! - **Sync Loop** (`SyncSession`): cancellable task firing one trigger per
//!   marker until exhausted or cancelled
//! - **Poll Driver** (`PollDriver`): fixed-interval scheduler tying the above
//!   together, with at most one session alive at a time
//!
//! # Example
//!
//! ```ignore
//! use lightbeat_sync::{PollDriver, SyncConfig};
//! use tokio::sync::watch;
//! use tokio_util::sync::CancellationToken;
//!
//! let (_granularity_tx, granularity_rx) = watch::channel(Granularity::Beat);
//! let driver = PollDriver::new(
//!     client.clone(),
//!     client,
//!     sink,
//!     granularity_rx,
//!     SyncConfig::default(),
//! );
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(driver.run(shutdown.clone()));
//! ```

mod cache;
mod detector;
mod driver;
mod error;
mod locator;
mod session;
mod types;

// Public exports
pub use cache::MarkerCache;
pub use detector::ChangeDetector;
pub use driver::PollDriver;
pub use error::{Result, SyncError};
pub use locator::locate;
pub use session::SyncSession;
pub use types::{
    Cause, CycleOutcome, Decision, Location, SessionOptions, SessionOutcome, SyncConfig,
};
