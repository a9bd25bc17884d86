//! Player state endpoints.

use crate::error::{Result, SpotifyError};
use crate::types::CurrentlyPlaying;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Player client for the Spotify Web API.
pub struct PlayerClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> PlayerClient<'a> {
    pub fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Get the item currently loaded in the user's player.
    ///
    /// Returns `None` when there is no active device (204 No Content).
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        let url = format!("{}/me/player/currently-playing", self.base_url);
        debug!(url = %url, "Fetching currently playing");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(SpotifyError::transport)?;

        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(SpotifyError::from_response(response).await);
        }

        let playing: CurrentlyPlaying = response.json().await.map_err(|e| {
            SpotifyError::ParseError(format!("Failed to parse currently playing: {}", e))
        })?;

        Ok(Some(playing))
    }
}
