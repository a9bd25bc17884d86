//! LightBeat Core
//!
//! Timing types, collaborator traits, and error handling shared by the
//! synchronization engine, the streaming-service client, and the gateway.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Timing Model**: `PlaybackSnapshot`, `Marker`, `MarkerList`, `TriggerEvent`
//! - **Collaborator Traits**: `PlaybackSource`, `AnalysisSource`, `EventSink`
//! - **Error Handling**: Unified `LightBeatError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lightbeat_core::types::{Granularity, Marker, MarkerList};
//! use std::time::Duration;
//!
//! let markers = MarkerList::new(
//!     Granularity::Beat,
//!     vec![
//!         Marker::new(Duration::ZERO, Duration::from_millis(500)),
//!         Marker::new(Duration::from_millis(500), Duration::from_millis(500)),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(markers.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LightBeatError, Result};
pub use traits::{AnalysisSource, EventSink, FanoutSink, PlaybackSource};

pub use types::{
    AudioFeatures, Granularity, Marker, MarkerList, PlaybackSnapshot, TrackId, TriggerEvent,
};
