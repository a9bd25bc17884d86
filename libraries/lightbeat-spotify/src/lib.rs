//! LightBeat Spotify Client
//!
//! HTTP client for the parts of the Spotify Web API the gateway needs.
//!
//! # Features
//!
//! - **Playback**: currently-playing item, progress and play state
//! - **Analysis**: beat, bar and tatum markers plus audio features
//! - **Authentication**: authorization-code flow, automatic access token
//!   refresh on 401
//! - **Token storage**: refresh token persisted to a JSON file
//!
//! `SpotifyClient` implements `PlaybackSource` and `AnalysisSource`, so it
//! plugs straight into the sync engine.
//!
//! # Example
//!
//! ```ignore
//! use lightbeat_spotify::{SpotifyClient, SpotifyConfig, TokenStore};
//!
//! let store = TokenStore::new("token.json");
//! let refresh_token = store.load()?.ok_or("run `authorize` first")?;
//!
//! let config = SpotifyConfig::with_credentials("client-id", "client-secret")
//!     .with_refresh_token(refresh_token);
//! let client = SpotifyClient::new(config)?;
//! client.refresh_access_token().await?;
//!
//! if let Some(playing) = client.currently_playing().await? {
//!     println!("{:?} at {}ms", playing.item, playing.progress_ms);
//! }
//! ```

mod analysis;
mod auth;
mod client;
mod error;
mod playback;
mod token_store;
mod types;

// Re-export main types
pub use client::SpotifyClient;
pub use error::{Result, SpotifyError};
pub use token_store::TokenStore;
pub use types::{
    AudioAnalysis, CurrentlyPlaying, PlayingItem, SpotifyConfig, TimeInterval, TokenResponse,
    DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE, SCOPES,
};

// Re-export sub-clients for direct use if needed
pub use analysis::AnalysisClient;
pub use auth::AuthClient;
pub use playback::PlayerClient;
