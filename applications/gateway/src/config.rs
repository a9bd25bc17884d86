/// Gateway configuration
use crate::error::{GatewayError, Result};
use lightbeat_core::Granularity;
use lightbeat_spotify::{SpotifyConfig, DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE};
use lightbeat_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_spotify")]
    pub spotify: SpotifySettings,

    #[serde(default = "default_sync")]
    pub sync: SyncSettings,

    #[serde(default = "default_events")]
    pub events: EventSettings,

    #[serde(default = "default_lights")]
    pub lights: LightSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifySettings {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_accounts_base")]
    pub accounts_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_seek_slack_ms")]
    pub seek_slack_ms: u64,

    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    #[serde(default)]
    pub granularity: Granularity,

    #[serde(default)]
    pub fire_final_marker: bool,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Messages buffered per subscriber before it starts lagging
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LightSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_pixels")]
    pub pixels: usize,

    #[serde(default = "default_brightness")]
    pub brightness: f32,

    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default = "default_callback_host")]
    pub callback_host: String,

    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
}

impl GatewayConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used when present. Environment variables override file values, e.g.
    /// `LIGHTBEAT_SPOTIFY__CLIENT_ID` or `LIGHTBEAT_SYNC__GRANULARITY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with LIGHTBEAT_)
        settings = settings.add_source(
            config::Environment::with_prefix("LIGHTBEAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.spotify.client_id.is_empty() || self.spotify.client_secret.is_empty() {
            return Err(GatewayError::Config(
                "Spotify client credentials are required (set LIGHTBEAT_SPOTIFY__CLIENT_ID and LIGHTBEAT_SPOTIFY__CLIENT_SECRET)"
                    .to_string(),
            ));
        }

        if self.sync.poll_interval_ms == 0 {
            return Err(GatewayError::Config(
                "sync.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.sync.fetch_timeout_ms == 0 {
            return Err(GatewayError::Config(
                "sync.fetch_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(GatewayError::Config(
                "events.channel_capacity must be greater than 0".to_string(),
            ));
        }

        if self.lights.enabled && self.lights.pixels == 0 {
            return Err(GatewayError::Config(
                "lights.pixels must be greater than 0 when lights are enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML, e.g. to bootstrap a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GatewayError::Config(e.to_string()))
    }
}

impl SpotifySettings {
    pub fn client_config(&self) -> SpotifyConfig {
        SpotifyConfig::with_credentials(&self.client_id, &self.client_secret)
            .with_bases(&self.api_base, &self.accounts_base)
    }
}

impl SyncSettings {
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            seek_slack: Duration::from_millis(self.seek_slack_ms),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            fire_final_marker: self.fire_final_marker,
            cache_capacity: self.cache_capacity,
        }
    }
}

impl AuthSettings {
    /// Redirect URI registered with the Spotify application
    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}/code", self.callback_host, self.callback_port)
    }
}

// Default values
fn default_spotify() -> SpotifySettings {
    SpotifySettings {
        client_id: String::new(),
        client_secret: String::new(),
        token_file: default_token_file(),
        api_base: default_api_base(),
        accounts_base: default_accounts_base(),
    }
}

fn default_token_file() -> PathBuf {
    PathBuf::from("tokens.json")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_accounts_base() -> String {
    DEFAULT_ACCOUNTS_BASE.to_string()
}

fn default_sync() -> SyncSettings {
    SyncSettings {
        poll_interval_ms: default_poll_interval_ms(),
        seek_slack_ms: default_seek_slack_ms(),
        fetch_timeout_ms: default_fetch_timeout_ms(),
        granularity: Granularity::default(),
        fire_final_marker: false,
        cache_capacity: default_cache_capacity(),
    }
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_seek_slack_ms() -> u64 {
    1_000
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_cache_capacity() -> usize {
    16
}

fn default_events() -> EventSettings {
    EventSettings {
        host: default_host(),
        port: default_port(),
        channel_capacity: default_channel_capacity(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_channel_capacity() -> usize {
    256
}

fn default_lights() -> LightSettings {
    LightSettings {
        enabled: false,
        pixels: default_pixels(),
        brightness: default_brightness(),
        flash_ms: default_flash_ms(),
    }
}

fn default_pixels() -> usize {
    8
}

fn default_brightness() -> f32 {
    0.5
}

fn default_flash_ms() -> u64 {
    100
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        callback_host: default_callback_host(),
        callback_port: default_callback_port(),
    }
}

fn default_callback_host() -> String {
    "localhost".to_string()
}

fn default_callback_port() -> u16 {
    8888
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            spotify: default_spotify(),
            sync: default_sync(),
            events: default_events(),
            lights: default_lights(),
            auth: default_auth(),
        }
    }
}
