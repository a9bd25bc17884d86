/// Playback snapshot types
use crate::types::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single poll's observation of the streaming service's playback state.
///
/// Immutable once fetched. `progress` is only meaningful when `track_id`
/// is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Currently playing item (empty = nothing playing)
    pub track_id: TrackId,

    /// Display name of the item, if the service reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_name: Option<String>,

    /// Whether playback is running
    pub is_playing: bool,

    /// Elapsed time into the track at fetch time
    #[serde(rename = "progress_ms", with = "crate::types::duration_ms")]
    pub progress: Duration,

    /// Total length of the track, if known
    #[serde(
        rename = "duration_ms",
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_ms"
    )]
    pub duration: Option<Duration>,

    /// When the snapshot was taken
    pub fetched_at: DateTime<Utc>,
}

impl PlaybackSnapshot {
    /// Create a snapshot taken now.
    pub fn new(track_id: impl Into<TrackId>, is_playing: bool, progress: Duration) -> Self {
        Self {
            track_id: track_id.into(),
            track_name: None,
            is_playing,
            progress,
            duration: None,
            fetched_at: Utc::now(),
        }
    }

    /// Snapshot representing "nothing playing".
    pub fn empty() -> Self {
        Self::new(TrackId::default(), false, Duration::ZERO)
    }

    /// Attach the track display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.track_name = Some(name.into());
        self
    }

    /// Attach the track length.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Whether this snapshot identifies a track.
    pub fn has_track(&self) -> bool {
        !self.track_id.is_empty()
    }

    /// Absolute difference in playback progress between two snapshots.
    pub fn progress_delta(&self, other: &PlaybackSnapshot) -> Duration {
        if self.progress >= other.progress {
            self.progress - other.progress
        } else {
            other.progress - self.progress
        }
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

mod optional_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
