//! Main Spotify client.

use crate::analysis::AnalysisClient;
use crate::auth::AuthClient;
use crate::error::{Result, SpotifyError};
use crate::playback::PlayerClient;
use crate::types::{AudioAnalysis, CurrentlyPlaying, SpotifyConfig, TokenResponse};
use async_trait::async_trait;
use lightbeat_core::{
    AnalysisSource, AudioFeatures, Granularity, MarkerList, PlaybackSnapshot, PlaybackSource,
    TrackId,
};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Per-request timeout; a hung request must not stall the poll loop
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the Spotify Web API.
///
/// Holds the token pair and transparently refreshes the access token when
/// a request comes back 401, retrying that request once.
///
/// # Example
///
/// ```ignore
/// use lightbeat_spotify::{SpotifyClient, SpotifyConfig};
///
/// let config = SpotifyConfig::with_credentials("id", "secret").with_refresh_token(token);
/// let client = SpotifyClient::new(config)?;
///
/// let analysis = client.audio_analysis(&track_id).await?;
/// println!("{} beats", analysis.beats.len());
/// ```
pub struct SpotifyClient {
    http: Client,
    config: Arc<RwLock<SpotifyConfig>>,
}

impl SpotifyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        let api_base = normalize_url(&config.api_base)?;
        let accounts_base = normalize_url(&config.accounts_base)?;

        let normalized_config = SpotifyConfig {
            api_base,
            accounts_base,
            ..config
        };

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .user_agent(format!("LightBeat/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SpotifyError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the Web API base URL.
    pub async fn api_base(&self) -> String {
        self.config.read().await.api_base.clone()
    }

    /// Check if the client holds an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Set tokens directly (e.g., from the token file).
    pub async fn set_tokens(&self, access_token: Option<String>, refresh_token: Option<String>) {
        let mut config = self.config.write().await;
        config.access_token = access_token;
        config.refresh_token = refresh_token;
    }

    /// Get the current tokens.
    pub async fn get_tokens(&self) -> (Option<String>, Option<String>) {
        let config = self.config.read().await;
        (config.access_token.clone(), config.refresh_token.clone())
    }

    /// URL the user opens to authorize this application.
    pub async fn authorize_url(&self, redirect_uri: &str) -> Result<Url> {
        let config = self.config.read().await;
        AuthClient::new(
            &self.http,
            &config.accounts_base,
            &config.client_id,
            &config.client_secret,
        )
        .authorize_url(redirect_uri)
    }

    /// Exchange an authorization code and store the resulting tokens.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let config = self.config.read().await.clone();
        let auth = AuthClient::new(
            &self.http,
            &config.accounts_base,
            &config.client_id,
            &config.client_secret,
        );
        let response = auth.exchange_code(code, redirect_uri).await?;

        self.set_tokens(
            Some(response.access_token.clone()),
            response.refresh_token.clone(),
        )
        .await;

        Ok(response)
    }

    /// Refresh the access token using the refresh token.
    ///
    /// Keeps the existing refresh token when the response carries none.
    pub async fn refresh_access_token(&self) -> Result<TokenResponse> {
        let config = self.config.read().await.clone();
        let refresh_token = config
            .refresh_token
            .as_deref()
            .ok_or(SpotifyError::AuthRequired)?;

        let auth = AuthClient::new(
            &self.http,
            &config.accounts_base,
            &config.client_id,
            &config.client_secret,
        );
        let response = auth.refresh(refresh_token).await?;

        let mut config = self.config.write().await;
        config.access_token = Some(response.access_token.clone());
        if let Some(rotated) = &response.refresh_token {
            info!("Refresh token rotated");
            config.refresh_token = Some(rotated.clone());
        }

        Ok(response)
    }

    /// Get the item currently loaded in the user's player.
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        let base = self.api_base().await;
        self.with_auto_refresh(|token| {
            let base = base.clone();
            async move {
                PlayerClient::new(&self.http, &base, &token)
                    .currently_playing()
                    .await
            }
        })
        .await
    }

    /// Get the audio analysis of a track.
    pub async fn audio_analysis(&self, track_id: &TrackId) -> Result<AudioAnalysis> {
        let base = self.api_base().await;
        self.with_auto_refresh(|token| {
            let base = base.clone();
            async move {
                AnalysisClient::new(&self.http, &base, &token)
                    .audio_analysis(track_id)
                    .await
            }
        })
        .await
    }

    /// Get the audio features of a track.
    pub async fn audio_features(&self, track_id: &TrackId) -> Result<AudioFeatures> {
        let base = self.api_base().await;
        self.with_auto_refresh(|token| {
            let base = base.clone();
            async move {
                AnalysisClient::new(&self.http, &base, &token)
                    .audio_features(track_id)
                    .await
            }
        })
        .await
    }

    /// Execute an operation with automatic token refresh on 401.
    ///
    /// If the operation fails with `AuthRequired`, attempts to refresh
    /// the token and retry once.
    pub async fn with_auto_refresh<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.access_token().await?;

        match operation(token).await {
            Ok(result) => Ok(result),
            Err(SpotifyError::AuthRequired) => {
                warn!("Access token rejected, attempting refresh");
                let refreshed = self.refresh_access_token().await?;
                operation(refreshed.access_token).await
            }
            Err(e) => Err(e),
        }
    }

    /// Current access token, refreshing first if only a refresh token is held.
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.config.read().await.access_token.clone() {
            return Ok(token);
        }
        debug!("No access token yet, refreshing");
        Ok(self.refresh_access_token().await?.access_token)
    }
}

fn normalize_url(url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(SpotifyError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = url.trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(SpotifyError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }
    Ok(url)
}

#[async_trait]
impl PlaybackSource for SpotifyClient {
    async fn current_playback(&self) -> lightbeat_core::Result<Option<PlaybackSnapshot>> {
        let playing = self.currently_playing().await?;
        Ok(playing.and_then(CurrentlyPlaying::into_snapshot))
    }
}

#[async_trait]
impl AnalysisSource for SpotifyClient {
    async fn marker_list(
        &self,
        track_id: &TrackId,
        granularity: Granularity,
    ) -> lightbeat_core::Result<MarkerList> {
        let analysis = self.audio_analysis(track_id).await?;
        analysis.marker_list(granularity)
    }

    async fn audio_features(&self, track_id: &TrackId) -> lightbeat_core::Result<AudioFeatures> {
        Ok(SpotifyClient::audio_features(self, track_id).await?)
    }
}
