//! Authorization-code flow against the Spotify accounts service.

use crate::error::{Result, SpotifyError};
use crate::types::{TokenResponse, SCOPES};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

/// Authentication client for the Spotify accounts service.
pub struct AuthClient<'a> {
    http: &'a Client,
    accounts_base: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

impl<'a> AuthClient<'a> {
    pub fn new(
        http: &'a Client,
        accounts_base: &'a str,
        client_id: &'a str,
        client_secret: &'a str,
    ) -> Self {
        Self {
            http,
            accounts_base,
            client_id,
            client_secret,
        }
    }

    /// URL the user opens to grant access.
    ///
    /// Spotify redirects back to `redirect_uri` with a `code` query
    /// parameter.
    pub fn authorize_url(&self, redirect_uri: &str) -> Result<Url> {
        let base = format!("{}/authorize", self.accounts_base);
        Url::parse_with_params(
            &base,
            &[
                ("client_id", self.client_id),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("scope", &SCOPES.join(" ")),
            ],
        )
        .map_err(|e| SpotifyError::InvalidUrl(format!("{}: {}", base, e)))
    }

    /// Exchange an authorization code for an access/refresh token pair.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        debug!("Exchanging authorization code");
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        if token.refresh_token.is_none() {
            return Err(SpotifyError::TokenRefreshFailed(
                "code exchange returned no refresh token".to_string(),
            ));
        }

        info!(scope = ?token.scope, "Authorization code exchanged");
        Ok(token)
    }

    /// Obtain a new access token from a refresh token.
    ///
    /// Spotify usually omits the refresh token from the response; the
    /// caller keeps the old one in that case.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        debug!("Refreshing access token");
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        debug!(expires_in = token.expires_in, "Token refresh successful");
        Ok(token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.accounts_base);

        let response = self
            .http
            .post(&url)
            .basic_auth(self.client_id, Some(self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(SpotifyError::transport)?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                SpotifyError::ParseError(format!("Failed to parse token response: {}", e))
            })
        } else if status.is_client_error() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Token request rejected");
            Err(SpotifyError::TokenRefreshFailed(error_text))
        } else {
            Err(SpotifyError::from_response(response).await)
        }
    }
}
