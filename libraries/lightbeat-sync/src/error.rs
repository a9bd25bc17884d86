use lightbeat_core::{LightBeatError, TrackId};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur inside the synchronization core.
///
/// None of these are fatal: the poll driver logs them and retries on the
/// next tick.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Playback fetch failed: {0}")]
    FetchFailure(#[source] LightBeatError),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Analysis fetch failed for {track_id}: {source}")]
    AnalysisFetchFailure {
        track_id: TrackId,
        #[source]
        source: LightBeatError,
    },

    #[error("Malformed marker list for {track_id}: {reason}")]
    MalformedMarkerList { track_id: TrackId, reason: String },
}

impl SyncError {
    /// Classify an analysis-source error for the given track
    pub(crate) fn analysis(track_id: &TrackId, source: LightBeatError) -> Self {
        match source {
            LightBeatError::MalformedMarkerList(reason) => Self::MalformedMarkerList {
                track_id: track_id.clone(),
                reason,
            },
            source => Self::AnalysisFetchFailure {
                track_id: track_id.clone(),
                source,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
