use crate::types::Location;
use lightbeat_core::MarkerList;
use std::time::Duration;

/// Find the marker interval in progress at `progress` and the time left
/// until the next marker boundary.
///
/// The located index is the last marker starting at or before `progress`,
/// or 0 when playback has not reached the first marker yet. Resuming
/// mid-interval yields a `time_to_fire` shorter than a full marker, so the
/// first trigger still lands on a track-relative boundary.
pub fn locate(markers: &MarkerList, progress: Duration) -> Location {
    let started = markers
        .as_slice()
        .partition_point(|marker| marker.start <= progress);
    let index = started.saturating_sub(1);

    let time_to_fire = markers
        .get(index + 1)
        .map(|next| next.start.saturating_sub(progress));

    Location {
        index,
        time_to_fire,
    }
}
