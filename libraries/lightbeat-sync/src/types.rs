use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning of the poll driver and sync loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Time between playback polls
    pub poll_interval: Duration,
    /// Extra progress drift tolerated on top of `poll_interval` before a
    /// change is treated as a seek
    pub seek_slack: Duration,
    /// Upper bound on each collaborator fetch
    pub fetch_timeout: Duration,
    /// Fire one last trigger at the end of the final marker
    pub fire_final_marker: bool,
    /// Number of marker lists kept in the analysis cache (0 disables it)
    pub cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            seek_slack: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(5),
            fire_final_marker: false,
            cache_capacity: 16,
        }
    }
}

/// Per-session behaviour handed to the sync loop at launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub fire_final_marker: bool,
}

/// Why the change detector asked for a stop and/or start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    /// Nothing changed
    None,
    /// A different track is playing
    TrackChanged,
    /// Progress moved further than normal playback allows
    Seeked,
    /// Playback went from playing to paused/stopped
    Paused,
    /// Playback went from paused to playing
    Resumed,
    /// Playing, but no session is running
    Unsynced,
}

/// Outcome of `ChangeDetector::decide`.
///
/// `stop` and `start` are independent: a track change while a session is
/// running yields both, and the stop is always applied first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub stop: bool,
    pub start: bool,
    pub cause: Cause,
}

impl Decision {
    pub const NO_ACTION: Decision = Decision {
        stop: false,
        start: false,
        cause: Cause::None,
    };

    pub fn is_no_action(&self) -> bool {
        !self.stop && !self.start
    }
}

/// Result of the marker locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Marker interval currently in progress (0 during a lead-in)
    pub index: usize,
    /// Time until the next marker boundary; `None` when `index` is the
    /// final marker and nothing is left to schedule
    pub time_to_fire: Option<Duration>,
}

/// How a sync loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Walked past the end of the marker list
    Exhausted { fired: usize },
    /// Stopped by the poll driver or shutdown
    Cancelled { fired: usize },
}

impl SessionOutcome {
    pub fn fired(&self) -> usize {
        match self {
            SessionOutcome::Exhausted { fired } | SessionOutcome::Cancelled { fired } => *fired,
        }
    }
}

/// What a single poll cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch failed, timed out, or reported nothing playing; state kept
    Skipped,
    /// Nothing to do
    Unchanged,
    /// Active session cancelled, none started
    Stopped,
    /// New session started, none was running
    Started,
    /// Active session cancelled and a new one started
    Restarted,
    /// A start was required but the marker list could not be obtained
    StartFailed,
}
