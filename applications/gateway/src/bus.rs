//! Messaging layer
//!
//! Everything the sync engine emits is published on a broadcast channel as
//! a `BusMessage` tagged with its `Topic`. WebSocket clients subscribe to
//! the channel; a slow client lags and loses messages instead of stalling
//! the sync loop.

use chrono::{DateTime, Utc};
use lightbeat_core::{AudioFeatures, EventSink, PlaybackSnapshot, TrackId, TriggerEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Message topics, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// One message per fired marker
    Beat,
    /// A sync session started for a track
    NewMedia,
    /// Audio features of the track that just started
    MediaFeatures,
    /// Granularity changes (inbound control, echoed to subscribers)
    SetTrigger,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Beat,
        Topic::NewMedia,
        Topic::MediaFeatures,
        Topic::SetTrigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Beat => "beat",
            Topic::NewMedia => "new-media",
            Topic::MediaFeatures => "media-features",
            Topic::SetTrigger => "set-trigger",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic '{}'", s))
    }
}

/// A message published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub topic: Topic,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl BusMessage {
    pub fn new(topic: Topic, payload: Value) -> Self {
        Self {
            topic,
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus shared by the sync engine and the HTTP surface.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusMessage>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish without blocking. Returns the number of subscribers reached.
    pub fn publish(&self, topic: Topic, payload: Value) -> usize {
        match self.tx.send(BusMessage::new(topic, payload)) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(%topic, "No subscribers");
                0
            }
        }
    }
}

impl EventSink for EventBus {
    fn trigger(&self, event: TriggerEvent) {
        self.publish(
            Topic::Beat,
            json!({
                "number": event.marker_index,
                "duration": event.marker_duration.as_millis() as u64,
                "track_id": event.track_id,
                "granularity": event.granularity,
            }),
        );
    }

    fn new_media(&self, snapshot: &PlaybackSnapshot) {
        match serde_json::to_value(snapshot) {
            Ok(payload) => {
                let reached = self.publish(Topic::NewMedia, payload);
                debug!(track_id = %snapshot.track_id, reached, "Published new media");
            }
            Err(e) => debug!(error = %e, "Could not serialize snapshot"),
        }
    }

    fn media_features(&self, track_id: &TrackId, features: &AudioFeatures) {
        self.publish(
            Topic::MediaFeatures,
            json!({
                "track_id": track_id,
                "features": features,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbeat_core::Granularity;
    use std::time::Duration;

    #[test]
    fn test_topic_wire_names() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
            assert_eq!(
                serde_json::to_value(topic).unwrap(),
                Value::String(topic.as_str().to_string())
            );
        }
        assert!("beats".parse::<Topic>().is_err());
    }

    #[tokio::test]
    async fn test_trigger_publishes_beat() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.trigger(TriggerEvent {
            track_id: TrackId::new("t"),
            marker_index: 3,
            marker_duration: Duration::from_millis(480),
            granularity: Granularity::Beat,
        });

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, Topic::Beat);
        assert_eq!(msg.payload["number"], 3);
        assert_eq!(msg.payload["duration"], 480);
        assert_eq!(msg.payload["track_id"], "t");
        assert_eq!(msg.payload["granularity"], "beat");
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish(Topic::Beat, json!({})), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_instead_of_blocking() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for i in 0..5 {
            bus.publish(Topic::Beat, json!({ "number": i }));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap().payload["number"], 3);
    }
}
