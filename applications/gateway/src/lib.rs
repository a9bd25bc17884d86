//! LightBeat Gateway Library
//!
//! Polls Spotify playback, keeps a beat-synchronized trigger loop running
//! for the current track and publishes the triggers to WebSocket
//! subscribers and an optional light strip.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod authorize;
pub mod bus;
pub mod config;
pub mod control;
pub mod error;
pub mod lights;
pub mod state;

// Re-export commonly used types for convenience
pub use bus::{BusMessage, EventBus, Topic};
pub use config::GatewayConfig;
pub use control::ControlRouter;
pub use error::{GatewayError, Result};
pub use lights::LightStrip;
pub use state::AppState;
