//! Tests for the Spotify client against a mock Web API.
//!
//! Both the API and the accounts service are served by one mock server.

use lightbeat_core::{AnalysisSource, Granularity, LightBeatError, PlaybackSource, TrackId};
use lightbeat_spotify::{SpotifyClient, SpotifyConfig, SpotifyError};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASIC_AUTH: &str = "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ=";

fn config(server: &MockServer) -> SpotifyConfig {
    SpotifyConfig::with_credentials("client-id", "client-secret")
        .with_bases(server.uri(), server.uri())
}

fn client_with_token(server: &MockServer, token: &str) -> SpotifyClient {
    SpotifyClient::new(
        config(server)
            .with_access_token(token)
            .with_refresh_token("refresh-1"),
    )
    .unwrap()
}

fn analysis_body() -> serde_json::Value {
    serde_json::json!({
        "bars": [
            { "start": 0.0, "duration": 2.0, "confidence": 0.9 },
            { "start": 2.0, "duration": 2.0, "confidence": 0.9 }
        ],
        "beats": [
            { "start": 0.0, "duration": 0.5, "confidence": 0.8 },
            { "start": 0.5, "duration": 0.5, "confidence": 0.8 },
            { "start": 1.0, "duration": 0.5, "confidence": 0.8 }
        ],
        "tatums": [],
        "sections": [],
        "track": { "duration": 4.0 }
    })
}

// =============================================================================
// Playback
// =============================================================================

mod playback {
    use super::*;

    #[tokio::test]
    async fn test_currently_playing_snapshot() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timestamp": 1_700_000_000_000u64,
                "progress_ms": 42_000,
                "is_playing": true,
                "item": { "id": "track-1", "name": "First", "duration_ms": 180_000 }
            })))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        let snapshot = client.current_playback().await.unwrap().unwrap();

        assert_eq!(snapshot.track_id.as_str(), "track-1");
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.progress, Duration::from_millis(42_000));
    }

    #[tokio::test]
    async fn test_no_content_means_nothing_playing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        assert!(client.currently_playing().await.unwrap().is_none());
        assert!(client.current_playback().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ad_without_item_id_is_nothing_playing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "progress_ms": 5_000,
                "is_playing": true,
                "currently_playing_type": "ad",
                "item": null
            })))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        assert!(client.current_playback().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");

        match client.currently_playing().await.unwrap_err() {
            SpotifyError::ServerError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }

        let err = client.current_playback().await.unwrap_err();
        assert!(matches!(err, LightBeatError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        match client.currently_playing().await.unwrap_err() {
            SpotifyError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 7),
            e => panic!("Expected RateLimited, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on the discard port
        let config = SpotifyConfig::with_credentials("id", "secret")
            .with_bases("http://127.0.0.1:9", "http://127.0.0.1:9")
            .with_access_token("token");
        let client = SpotifyClient::new(config).unwrap();

        let err = client.current_playback().await.unwrap_err();
        assert!(matches!(err, LightBeatError::Network(_)));
    }
}

// =============================================================================
// Token refresh
// =============================================================================

mod token_refresh {
    use super::*;

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("Authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("Authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("Authorization", BASIC_AUTH))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "stale");
        assert!(client.currently_playing().await.unwrap().is_none());

        let (access, refresh) = client.get_tokens().await;
        assert_eq!(access.as_deref(), Some("fresh"));
        // Refresh token kept when the response omits it
        assert_eq!(refresh.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried_again() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "still-bad"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "stale");
        assert!(matches!(
            client.currently_playing().await,
            Err(SpotifyError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_revoked_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Refresh token revoked"
            })))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "stale");
        match client.currently_playing().await.unwrap_err() {
            SpotifyError::TokenRefreshFailed(msg) => assert!(msg.contains("invalid_grant")),
            e => panic!("Expected TokenRefreshFailed, got: {:?}", e),
        }

        let err = client.current_playback().await.unwrap_err();
        assert!(matches!(err, LightBeatError::Auth(_)));
    }

    #[tokio::test]
    async fn test_refresh_before_first_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "first",
                "refresh_token": "rotated"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("Authorization", "Bearer first"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            SpotifyClient::new(config(&mock_server).with_refresh_token("refresh-1")).unwrap();
        assert!(!client.is_authenticated().await);

        client.currently_playing().await.unwrap();
        let (access, refresh) = client.get_tokens().await;
        assert_eq!(access.as_deref(), Some("first"));
        assert_eq!(refresh.as_deref(), Some("rotated"));
    }
}

// =============================================================================
// Authorization code flow
// =============================================================================

mod authorization {
    use super::*;

    #[tokio::test]
    async fn test_exchange_code_stores_tokens() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("Authorization", BASIC_AUTH))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "scope": "user-read-currently-playing user-read-playback-state"
            })))
            .mount(&mock_server)
            .await;

        let client = SpotifyClient::new(config(&mock_server)).unwrap();
        let token = client
            .exchange_code("abc123", "http://localhost:8888/code")
            .await
            .unwrap();

        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_exchange_rejected_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&mock_server)
            .await;

        let client = SpotifyClient::new(config(&mock_server)).unwrap();
        let result = client.exchange_code("expired", "http://localhost:8888/code").await;

        assert!(matches!(result, Err(SpotifyError::TokenRefreshFailed(_))));
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_authorize_url_uses_accounts_base() {
        let mock_server = MockServer::start().await;
        let client = SpotifyClient::new(config(&mock_server)).unwrap();

        let url = client
            .authorize_url("http://localhost:8888/code")
            .await
            .unwrap();
        assert!(url.as_str().starts_with(&format!("{}/authorize?", mock_server.uri())));
    }
}

// =============================================================================
// Analysis
// =============================================================================

mod analysis {
    use super::*;

    #[tokio::test]
    async fn test_marker_list_per_granularity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audio-analysis/track-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        let track = TrackId::new("track-1");

        let beats = client.marker_list(&track, Granularity::Beat).await.unwrap();
        assert_eq!(beats.len(), 3);
        assert_eq!(beats.granularity(), Granularity::Beat);
        assert_eq!(beats[2].start, Duration::from_secs(1));

        let bars = client.marker_list(&track, Granularity::Bar).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].duration, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_granularity_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audio-analysis/track-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        let result = client
            .marker_list(&TrackId::new("track-1"), Granularity::Tatum)
            .await;

        assert!(matches!(result, Err(LightBeatError::MalformedMarkerList(_))));
    }

    #[tokio::test]
    async fn test_analysis_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audio-analysis/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("analysis not found"))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        let result = client
            .marker_list(&TrackId::new("missing"), Granularity::Beat)
            .await;

        assert!(matches!(result, Err(LightBeatError::Upstream { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_audio_features() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/audio-features/track-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "track-1",
                "tempo": 128.02,
                "energy": 0.81,
                "danceability": 0.7,
                "valence": 0.4,
                "loudness": -5.2,
                "key": 5,
                "mode": 1,
                "time_signature": 4,
                "acousticness": 0.01
            })))
            .mount(&mock_server)
            .await;

        let client = client_with_token(&mock_server, "token-1");
        let features = client.audio_features(&TrackId::new("track-1")).await.unwrap();

        assert_eq!(features.tempo, 128.02);
        assert_eq!(features.key, 5);
        assert_eq!(features.time_signature, 4);
    }
}
