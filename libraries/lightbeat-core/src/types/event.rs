/// Trigger events emitted at marker boundaries
use crate::types::{Granularity, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Emitted once per fired marker.
///
/// Consumers (messaging, lights) receive it fire-and-forget; the sync
/// engine keeps no reference after emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Track the marker belongs to
    pub track_id: TrackId,
    /// Index of the fired marker within its list
    pub marker_index: usize,
    /// Length of the fired marker's interval
    #[serde(rename = "marker_duration_ms", with = "crate::types::duration_ms")]
    pub marker_duration: Duration,
    /// Interval kind the marker came from
    pub granularity: Granularity,
}
