/// Control API routes
use crate::bus::Topic;
use crate::error::{GatewayError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// POST /api/control/:topic - Deliver an inbound control message
///
/// Accepted messages are echoed on the bus so every subscriber sees the
/// change.
pub async fn publish(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    let topic: Topic = topic.parse().map_err(GatewayError::NotFound)?;

    let reply = state.control.dispatch(topic, &payload)?;
    state.bus.publish(topic, reply.clone());

    Ok(Json(reply))
}

/// GET /api/control/trigger - Granularity the next session will use
pub async fn current_trigger(State(state): State<AppState>) -> Json<Value> {
    let granularity = *state.granularity.borrow();
    Json(json!({ "granularity": granularity }))
}
