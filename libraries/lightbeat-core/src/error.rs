/// Core error types for LightBeat
use thiserror::Error;

/// Result type alias using `LightBeatError`
pub type Result<T> = std::result::Result<T, LightBeatError>;

/// Core error type for LightBeat
///
/// Collaborators (streaming-service client, analysis client) map their own
/// errors into this type at the trait boundary.
#[derive(Error, Debug)]
pub enum LightBeatError {
    /// Transient network failure talking to a collaborator
    #[error("Network error: {0}")]
    Network(String),

    /// Authorization failed or expired
    #[error("Authorization error: {0}")]
    Auth(String),

    /// Collaborator returned a non-success response
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Timing analysis could not be turned into a usable marker list
    #[error("Malformed marker list: {0}")]
    MalformedMarkerList(String),

    /// Unknown marker granularity name
    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl LightBeatError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an authorization error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a malformed marker list error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMarkerList(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether retrying on the next poll tick may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Auth(_) | Self::Upstream { .. })
    }
}
