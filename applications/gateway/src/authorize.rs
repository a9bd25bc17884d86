//! One-time authorization-code flow
//!
//! Prints the Spotify consent URL, waits for the redirect on the local
//! callback listener, exchanges the code and stores the refresh token.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use lightbeat_spotify::{SpotifyClient, TokenStore};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Router serving `GET /code`; each redirect is forwarded on `tx`.
pub fn callback_router(tx: mpsc::Sender<std::result::Result<String, String>>) -> Router {
    Router::new().route("/code", get(callback)).with_state(tx)
}

async fn callback(
    State(tx): State<mpsc::Sender<std::result::Result<String, String>>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    let (outcome, reply) = match (params.code, params.error) {
        (Some(code), _) if !code.is_empty() => (
            Ok(code),
            (StatusCode::OK, "Authorized. You can close this window."),
        ),
        (_, Some(error)) => (
            Err(error),
            (StatusCode::BAD_REQUEST, "Authorization was denied."),
        ),
        _ => (
            Err("callback without code".to_string()),
            (StatusCode::BAD_REQUEST, "Missing authorization code."),
        ),
    };

    if tx.try_send(outcome).is_err() {
        warn!("Authorization already completed, ignoring callback");
    }
    reply
}

/// Run the flow end to end.
pub async fn authorize(config: &GatewayConfig) -> Result<()> {
    let client = SpotifyClient::new(config.spotify.client_config())?;
    let redirect_uri = config.auth.redirect_uri();
    let url = client.authorize_url(&redirect_uri).await?;

    let (tx, mut rx) = mpsc::channel(1);
    let listener = tokio::net::TcpListener::bind((
        config.auth.callback_host.as_str(),
        config.auth.callback_port,
    ))
    .await?;

    println!("Open this URL in a browser to authorize LightBeat:\n\n  {}\n", url);
    info!(redirect_uri = %redirect_uri, "Waiting for authorization callback");

    let server = tokio::spawn(async move {
        axum::serve(listener, callback_router(tx)).await
    });

    let outcome = rx.recv().await;
    server.abort();

    let code = match outcome {
        Some(Ok(code)) => code,
        Some(Err(error)) => {
            return Err(GatewayError::Internal(format!(
                "Authorization failed: {}",
                error
            )))
        }
        None => {
            return Err(GatewayError::Internal(
                "Callback listener stopped".to_string(),
            ))
        }
    };

    let token = client.exchange_code(&code, &redirect_uri).await?;
    let refresh_token = token.refresh_token.ok_or_else(|| {
        GatewayError::Internal("Spotify returned no refresh token".to_string())
    })?;

    let store = TokenStore::new(&config.spotify.token_file);
    store.save(&refresh_token).await?;
    println!("Saved refresh token to {}", store.path().display());

    Ok(())
}
