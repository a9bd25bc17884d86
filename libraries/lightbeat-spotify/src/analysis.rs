//! Track analysis endpoints.

use crate::error::{Result, SpotifyError};
use crate::types::AudioAnalysis;
use lightbeat_core::{AudioFeatures, TrackId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Analysis client for the Spotify Web API.
pub struct AnalysisClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> AnalysisClient<'a> {
    pub fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Get the full audio analysis (bars, beats, tatums) of a track.
    pub async fn audio_analysis(&self, track_id: &TrackId) -> Result<AudioAnalysis> {
        let url = format!("{}/audio-analysis/{}", self.base_url, track_id);
        debug!(url = %url, "Fetching audio analysis");
        self.get(&url, "audio analysis").await
    }

    /// Get the audio features (tempo, energy, ...) of a track.
    pub async fn audio_features(&self, track_id: &TrackId) -> Result<AudioFeatures> {
        let url = format!("{}/audio-features/{}", self.base_url, track_id);
        debug!(url = %url, "Fetching audio features");
        self.get(&url, "audio features").await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(SpotifyError::transport)?;

        if !response.status().is_success() {
            return Err(SpotifyError::from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SpotifyError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }
}
