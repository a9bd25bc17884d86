//! WebSocket stream of bus messages.
//!
//! Clients connect to `/api/events`, optionally with `?topics=beat,new-media`
//! to filter. The filter can be changed later by sending
//! `{"action": "subscribe" | "unsubscribe", "topics": [...]}`.

use crate::bus::{BusMessage, Topic};
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Comma-separated topic names; all topics when absent
    pub topics: Option<String>,
}

/// Client subscription message
#[derive(Debug, Deserialize)]
struct SubscriptionMessage {
    action: String,
    #[serde(default)]
    topics: Vec<Topic>,
}

/// Topic filter for one connection. Empty means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter(HashSet<Topic>);

impl TopicFilter {
    /// Parse a comma-separated list, ignoring unknown names.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse() {
                    Ok(topic) => Some(topic),
                    Err(e) => {
                        debug!(error = %e, "Ignoring topic in filter");
                        None
                    }
                })
                .collect(),
        )
    }

    pub fn matches(&self, topic: Topic) -> bool {
        self.0.is_empty() || self.0.contains(&topic)
    }

    fn subscribe(&mut self, topics: &[Topic]) {
        if topics.is_empty() {
            self.0.clear();
        } else {
            self.0.extend(topics.iter().copied());
        }
    }

    fn unsubscribe(&mut self, topics: &[Topic]) {
        if self.0.is_empty() {
            self.0 = Topic::ALL.into_iter().collect();
        }
        for topic in topics {
            self.0.remove(topic);
        }
    }
}

/// GET /api/events - WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<EventsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let filter = query
        .topics
        .as_deref()
        .map(TopicFilter::parse)
        .unwrap_or_default();
    ws.on_upgrade(move |socket| handle_socket(socket, state, filter))
}

async fn handle_socket(socket: WebSocket, state: AppState, filter: TopicFilter) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.bus.subscribe();
    let (filter_tx, mut filter_rx) = mpsc::channel::<TopicFilter>(16);

    debug!(?filter, "Event subscriber connected");

    let mut local_filter = filter.clone();
    let send_task = tokio::spawn(async move {
        let mut filter = filter;
        loop {
            tokio::select! {
                result = rx.recv() => match result {
                    Ok(message) => {
                        if !filter.matches(message.topic) {
                            continue;
                        }
                        let Some(text) = encode(&message) else { continue };
                        if sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Event subscriber lagging, messages dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(next) = filter_rx.recv() => filter = next,
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                let Ok(sub) = serde_json::from_str::<SubscriptionMessage>(&text) else {
                    debug!("Ignoring malformed subscription message");
                    continue;
                };
                match sub.action.as_str() {
                    "subscribe" => local_filter.subscribe(&sub.topics),
                    "unsubscribe" => local_filter.unsubscribe(&sub.topics),
                    other => {
                        debug!(action = other, "Unknown subscription action");
                        continue;
                    }
                }
                if filter_tx.send(local_filter.clone()).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    debug!("Event subscriber disconnected");
}

fn encode(message: &BusMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, topic = %message.topic, "Could not encode bus message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        let filter = TopicFilter::parse("beat, new-media,bogus,");
        assert!(filter.matches(Topic::Beat));
        assert!(filter.matches(Topic::NewMedia));
        assert!(!filter.matches(Topic::MediaFeatures));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = TopicFilter::default();
        assert!(Topic::ALL.into_iter().all(|t| filter.matches(t)));
    }

    #[test]
    fn test_unsubscribe_from_everything() {
        let mut filter = TopicFilter::default();
        filter.unsubscribe(&[Topic::Beat]);
        assert!(!filter.matches(Topic::Beat));
        assert!(filter.matches(Topic::SetTrigger));

        filter.subscribe(&[]);
        assert!(filter.matches(Topic::Beat));
    }
}
