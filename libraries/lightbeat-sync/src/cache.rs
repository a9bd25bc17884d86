use lightbeat_core::{Granularity, MarkerList, TrackId};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Bounded cache of marker lists keyed by track and granularity.
///
/// Restarting on the same track (seek, pause/resume) reuses the analysis
/// instead of fetching it again. Only successful fetches are stored.
pub struct MarkerCache {
    entries: Option<LruCache<(TrackId, Granularity), Arc<MarkerList>>>,
}

impl MarkerCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn get(&mut self, track_id: &TrackId, granularity: Granularity) -> Option<Arc<MarkerList>> {
        self.entries
            .as_mut()?
            .get(&(track_id.clone(), granularity))
            .cloned()
    }

    pub fn insert(
        &mut self,
        track_id: TrackId,
        granularity: Granularity,
        markers: Arc<MarkerList>,
    ) {
        if let Some(entries) = self.entries.as_mut() {
            entries.put((track_id, granularity), markers);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbeat_core::Marker;
    use std::time::Duration;

    fn list(granularity: Granularity) -> Arc<MarkerList> {
        Arc::new(
            MarkerList::new(
                granularity,
                vec![Marker::new(Duration::ZERO, Duration::from_millis(500))],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_keyed_by_granularity() {
        let mut cache = MarkerCache::new(4);
        let track = TrackId::new("t");
        cache.insert(track.clone(), Granularity::Beat, list(Granularity::Beat));

        assert!(cache.get(&track, Granularity::Beat).is_some());
        assert!(cache.get(&track, Granularity::Bar).is_none());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = MarkerCache::new(2);
        cache.insert(TrackId::new("a"), Granularity::Beat, list(Granularity::Beat));
        cache.insert(TrackId::new("b"), Granularity::Beat, list(Granularity::Beat));
        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get(&TrackId::new("a"), Granularity::Beat).is_some());
        cache.insert(TrackId::new("c"), Granularity::Beat, list(Granularity::Beat));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&TrackId::new("a"), Granularity::Beat).is_some());
        assert!(cache.get(&TrackId::new("b"), Granularity::Beat).is_none());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = MarkerCache::new(0);
        cache.insert(TrackId::new("a"), Granularity::Beat, list(Granularity::Beat));
        assert!(cache.is_empty());
        assert!(cache.get(&TrackId::new("a"), Granularity::Beat).is_none());
    }
}
