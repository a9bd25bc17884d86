//! Inbound control messages
//!
//! Each inbound topic maps to a handler at compile time; topics without one
//! are outbound-only.

use crate::bus::Topic;
use crate::error::{GatewayError, Result};
use lightbeat_core::Granularity;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::info;

pub struct ControlRouter {
    granularity: watch::Sender<Granularity>,
}

impl ControlRouter {
    pub fn new(granularity: watch::Sender<Granularity>) -> Self {
        Self { granularity }
    }

    pub fn accepts(&self, topic: Topic) -> bool {
        matches!(topic, Topic::SetTrigger)
    }

    pub fn dispatch(&self, topic: Topic, payload: &Value) -> Result<Value> {
        match topic {
            Topic::SetTrigger => set_trigger(&self.granularity, payload),
            Topic::Beat | Topic::NewMedia | Topic::MediaFeatures => Err(GatewayError::BadRequest(
                format!("topic '{}' does not accept control messages", topic),
            )),
        }
    }
}

/// Accepts `"bar"` or `{"granularity": "bar"}`. The new granularity applies
/// to the next sync session; the running one keeps its markers.
fn set_trigger(granularity: &watch::Sender<Granularity>, payload: &Value) -> Result<Value> {
    let name = payload
        .as_str()
        .or_else(|| payload.get("granularity").and_then(Value::as_str))
        .ok_or_else(|| {
            GatewayError::BadRequest("expected a granularity name (beat, bar, tatum)".to_string())
        })?;

    let next: Granularity = name
        .parse()
        .map_err(|e: lightbeat_core::LightBeatError| GatewayError::BadRequest(e.to_string()))?;

    let previous = granularity.send_replace(next);
    if previous != next {
        info!(%previous, granularity = %next, "Trigger granularity changed");
    }

    Ok(json!({
        "granularity": next,
        "previous": previous,
    }))
}
