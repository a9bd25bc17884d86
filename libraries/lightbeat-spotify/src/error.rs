//! Error types for the Spotify client.

use lightbeat_core::LightBeatError;
use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Errors that can occur when talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("Spotify error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Access token missing or rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Token refresh or code exchange failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid API or accounts URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// IO error reading or writing the token file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection refused or timed out
    #[error("Spotify unreachable: {0}")]
    ServerUnreachable(String),

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

/// Result type for Spotify client operations.
pub type Result<T> = std::result::Result<T, SpotifyError>;

impl SpotifyError {
    /// Classify a transport failure.
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }

    /// Turn a non-success response into an error.
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => Self::AuthRequired,
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                Self::RateLimited { retry_after_secs }
            }
            _ => Self::ServerError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        }
    }
}

impl From<SpotifyError> for LightBeatError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::Request(_) | SpotifyError::ServerUnreachable(_) => {
                LightBeatError::network(e.to_string())
            }
            SpotifyError::AuthRequired | SpotifyError::TokenRefreshFailed(_) => {
                LightBeatError::auth(e.to_string())
            }
            SpotifyError::ServerError { status, message } => {
                LightBeatError::Upstream { status, message }
            }
            SpotifyError::RateLimited { .. } => LightBeatError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                message: e.to_string(),
            },
            SpotifyError::InvalidUrl(msg) => LightBeatError::invalid_input(msg),
            SpotifyError::ParseError(_) | SpotifyError::Io(_) => {
                LightBeatError::Other(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_stay_transient() {
        let e: LightBeatError = SpotifyError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(e.is_transient());

        let e: LightBeatError = SpotifyError::RateLimited {
            retry_after_secs: 3,
        }
        .into();
        assert!(matches!(e, LightBeatError::Upstream { status: 429, .. }));
    }

    #[test]
    fn test_auth_errors_map_to_auth() {
        let e: LightBeatError = SpotifyError::TokenRefreshFailed("revoked".into()).into();
        assert!(matches!(e, LightBeatError::Auth(_)));
    }
}
