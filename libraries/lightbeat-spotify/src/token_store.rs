//! Refresh token persistence.

use crate::error::{Result, SpotifyError};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Serialize, Deserialize)]
struct StoredToken {
    refresh_token: String,
}

/// JSON file holding the long-lived refresh token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored refresh token. Returns `None` if the file does not
    /// exist yet.
    pub async fn load(&self) -> Result<Option<String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored token");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredToken = serde_json::from_str(&contents).map_err(|e| {
            SpotifyError::ParseError(format!("Invalid token file {}: {}", self.path.display(), e))
        })?;

        Ok(Some(stored.refresh_token).filter(|t| !t.is_empty()))
    }

    /// Write the refresh token, creating parent directories as needed.
    pub async fn save(&self, refresh_token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(&StoredToken {
            refresh_token: refresh_token.to_string(),
        })
        .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        tokio::fs::write(&self.path, contents).await?;
        info!(path = %self.path.display(), "Saved refresh token");
        Ok(())
    }
}
