//! Types for the Spotify Web API.

use lightbeat_core::{Granularity, LightBeatError, Marker, MarkerList, PlaybackSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Web API base URL
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Default accounts service base URL
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Scopes requested during authorization
pub const SCOPES: &[&str] = &["user-read-currently-playing", "user-read-playback-state"];

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    /// Web API base URL (e.g., `https://api.spotify.com/v1`)
    pub api_base: String,
    /// Accounts service base URL
    pub accounts_base: String,
    /// Application client id
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// Access token (if authenticated)
    pub access_token: Option<String>,
    /// Refresh token for obtaining new access tokens
    pub refresh_token: Option<String>,
}

impl SpotifyConfig {
    /// Configuration for the public Spotify endpoints.
    pub fn with_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            refresh_token: None,
        }
    }

    /// Point both API and accounts requests at other base URLs.
    pub fn with_bases(
        mut self,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }
}

/// Response from `/me/player/currently-playing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    /// Server timestamp of the observation (ms since epoch)
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub is_playing: bool,
    /// Null for ads and while nothing is loaded
    #[serde(default)]
    pub item: Option<PlayingItem>,
}

/// Track (or episode) currently loaded in the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingItem {
    /// Null for local files
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
}

impl CurrentlyPlaying {
    /// Convert to a snapshot. Returns `None` when no identifiable item is
    /// loaded.
    pub fn into_snapshot(self) -> Option<PlaybackSnapshot> {
        let item = self.item?;
        let id = item.id.filter(|id| !id.is_empty())?;

        let mut snapshot = PlaybackSnapshot::new(
            id,
            self.is_playing,
            Duration::from_millis(self.progress_ms.unwrap_or_default()),
        );
        if !item.name.is_empty() {
            snapshot = snapshot.with_name(item.name);
        }
        if item.duration_ms > 0 {
            snapshot = snapshot.with_duration(Duration::from_millis(item.duration_ms));
        }
        Some(snapshot)
    }
}

/// One analysis interval, in fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// Response from `/audio-analysis/{id}`, reduced to the marker arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    #[serde(default)]
    pub bars: Vec<TimeInterval>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
    #[serde(default)]
    pub tatums: Vec<TimeInterval>,
}

impl AudioAnalysis {
    pub fn intervals(&self, granularity: Granularity) -> &[TimeInterval] {
        match granularity {
            Granularity::Beat => &self.beats,
            Granularity::Bar => &self.bars,
            Granularity::Tatum => &self.tatums,
        }
    }

    /// Build the marker list for `granularity`.
    ///
    /// Intervals with a negative, non-finite or zero length are dropped.
    pub fn marker_list(
        &self,
        granularity: Granularity,
    ) -> std::result::Result<MarkerList, LightBeatError> {
        let markers = self
            .intervals(granularity)
            .iter()
            .filter_map(|i| Marker::from_secs_f64(i.start, i.duration))
            .collect();
        MarkerList::new(granularity, markers)
    }
}

/// Response from the accounts token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    /// Absent on most refresh responses
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}
