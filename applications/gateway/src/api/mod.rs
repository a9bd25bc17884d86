/// API route modules
pub mod control;
pub mod events;
pub mod health;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the gateway's HTTP router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/events", get(events::ws_handler))
        .route("/control/trigger", get(control::current_trigger))
        .route("/control/:topic", post(control::publish));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
