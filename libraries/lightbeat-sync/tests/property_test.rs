//! Property-based tests for the locator and change detector
//!
//! Uses proptest to verify invariants across arbitrary marker lists and
//! snapshot pairs.

use lightbeat_core::{Granularity, Marker, MarkerList, PlaybackSnapshot};
use lightbeat_sync::{locate, ChangeDetector};
use proptest::prelude::*;
use std::time::Duration;

// ===== Helpers =====

/// Contiguous marker lists built from arbitrary interval lengths
fn arbitrary_markers() -> impl Strategy<Value = MarkerList> {
    (
        0u64..5_000,                                  // offset of the first marker
        prop::collection::vec(1u64..3_000, 2..100), // durations in ms
    )
        .prop_map(|(offset, durations)| {
            let mut start = offset;
            let markers = durations
                .into_iter()
                .map(|d| {
                    let marker =
                        Marker::new(Duration::from_millis(start), Duration::from_millis(d));
                    start += d;
                    marker
                })
                .collect();
            MarkerList::new(Granularity::Beat, markers).unwrap()
        })
}

fn arbitrary_snapshot() -> impl Strategy<Value = PlaybackSnapshot> {
    (
        prop::sample::select(vec!["a", "b", "c"]),
        any::<bool>(),
        0u64..600_000,
    )
        .prop_map(|(track, playing, progress)| {
            PlaybackSnapshot::new(track, playing, Duration::from_millis(progress))
        })
}

// ===== Property Tests =====

proptest! {
    /// Property: the located index never moves backwards as progress grows
    #[test]
    fn locate_is_monotonic(
        markers in arbitrary_markers(),
        mut progress in prop::collection::vec(0u64..400_000, 2..50)
    ) {
        progress.sort_unstable();

        let indices: Vec<usize> = progress
            .iter()
            .map(|&p| locate(&markers, Duration::from_millis(p)).index)
            .collect();

        prop_assert!(indices.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(indices.iter().all(|&i| i < markers.len()));
    }

    /// Property: at progress zero the first marker is located and the
    /// wait equals the second marker's start
    #[test]
    fn locate_at_zero_targets_second_marker(markers in arbitrary_markers()) {
        let location = locate(&markers, Duration::ZERO);

        prop_assert_eq!(location.index, 0);
        prop_assert_eq!(location.time_to_fire, Some(markers[1].start));
    }

    /// Property: the next boundary is never in the past and never further
    /// than one interval away once playback is inside the list
    #[test]
    fn time_to_fire_is_bounded(
        markers in arbitrary_markers(),
        progress in 0u64..400_000
    ) {
        let progress = Duration::from_millis(progress);
        let location = locate(&markers, progress);

        match location.time_to_fire {
            Some(wait) => {
                let next = markers[location.index + 1].start;
                prop_assert_eq!(progress + wait, next.max(progress));
                if progress >= markers[0].start {
                    prop_assert!(wait <= markers[location.index].duration);
                }
            }
            None => prop_assert_eq!(location.index, markers.last_index()),
        }
    }

    /// Property: going from paused to playing always requests a start
    #[test]
    fn resume_always_starts(
        previous in arbitrary_snapshot(),
        current in arbitrary_snapshot(),
        session_active in any::<bool>()
    ) {
        let mut previous = previous;
        let mut current = current;
        previous.is_playing = false;
        current.is_playing = true;

        let decision = ChangeDetector::default().decide(&previous, &current, session_active);
        prop_assert!(decision.start);
    }

    /// Property: nothing is ever stopped when no session is running
    #[test]
    fn no_stop_without_session(
        previous in arbitrary_snapshot(),
        current in arbitrary_snapshot()
    ) {
        let decision = ChangeDetector::default().decide(&previous, &current, false);
        prop_assert!(!decision.stop);
    }

    /// Property: an unchanged snapshot with a running session is a no-op
    #[test]
    fn identical_snapshot_is_no_action(current in arbitrary_snapshot()) {
        let decision = ChangeDetector::default().decide(&current, &current, true);
        prop_assert!(decision.is_no_action());
    }
}
