use crate::types::{Cause, Decision};
use lightbeat_core::PlaybackSnapshot;
use std::time::Duration;

/// Decides whether consecutive playback snapshots require the sync loop to
/// be stopped, (re)started, or left alone.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    poll_interval: Duration,
    seek_slack: Duration,
}

impl ChangeDetector {
    pub fn new(poll_interval: Duration, seek_slack: Duration) -> Self {
        Self {
            poll_interval,
            seek_slack,
        }
    }

    /// Largest progress change between two polls still considered normal
    /// playback.
    pub fn seek_threshold(&self) -> Duration {
        self.poll_interval + self.seek_slack
    }

    /// Compare the previous and current snapshot.
    ///
    /// A snapshot with an empty track identity never causes a change; the
    /// caller is expected to skip the cycle and keep `previous`.
    ///
    /// `synced` is true while a loop covers the current track, including
    /// one that already ran out of markers.
    pub fn decide(
        &self,
        previous: &PlaybackSnapshot,
        current: &PlaybackSnapshot,
        synced: bool,
    ) -> Decision {
        if !current.has_track() {
            return Decision::NO_ACTION;
        }

        let play_state_changed = previous.is_playing != current.is_playing;
        let paused = play_state_changed && !current.is_playing;
        let resumed = play_state_changed && current.is_playing;
        let track_changed = previous.track_id != current.track_id;
        let seeked = current.progress_delta(previous) > self.seek_threshold();
        let unsynced = current.is_playing && !synced;

        let stop = synced && (paused || track_changed || seeked);
        let start = resumed || track_changed || seeked || unsynced;

        let cause = if track_changed {
            Cause::TrackChanged
        } else if seeked {
            Cause::Seeked
        } else if paused {
            Cause::Paused
        } else if resumed {
            Cause::Resumed
        } else if unsynced {
            Cause::Unsynced
        } else {
            Cause::None
        };

        Decision { stop, start, cause }
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(1))
    }
}
