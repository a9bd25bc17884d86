/// Collaborator traits for LightBeat
///
/// The sync engine only calls these; the streaming-service client, the
/// messaging layer and the light driver implement them.
use crate::error::Result;
use crate::types::{AudioFeatures, Granularity, MarkerList, PlaybackSnapshot, TrackId, TriggerEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the currently playing state
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Fetch the current playback snapshot
    ///
    /// Returns `Ok(None)` when the service reports no active device or
    /// nothing playing.
    ///
    /// # Errors
    /// Returns an error on transient network/auth failures
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>>;
}

/// Source of per-track timing analysis
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Fetch the marker list of a track at the given granularity
    ///
    /// # Errors
    /// Returns an error if the analysis cannot be fetched or contains no
    /// usable markers
    async fn marker_list(&self, track_id: &TrackId, granularity: Granularity)
        -> Result<MarkerList>;

    /// Fetch high-level audio features of a track
    ///
    /// # Errors
    /// Returns an error if the features cannot be fetched
    async fn audio_features(&self, track_id: &TrackId) -> Result<AudioFeatures>;
}

#[async_trait]
impl<T: PlaybackSource + ?Sized> PlaybackSource for Arc<T> {
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>> {
        (**self).current_playback().await
    }
}

#[async_trait]
impl<T: AnalysisSource + ?Sized> AnalysisSource for Arc<T> {
    async fn marker_list(
        &self,
        track_id: &TrackId,
        granularity: Granularity,
    ) -> Result<MarkerList> {
        (**self).marker_list(track_id, granularity).await
    }

    async fn audio_features(&self, track_id: &TrackId) -> Result<AudioFeatures> {
        (**self).audio_features(track_id).await
    }
}

/// Receiver of sync events
///
/// Calls must not block: implementations hand work off (channel send,
/// spawned task) so a slow consumer never stalls the timing loop.
pub trait EventSink: Send + Sync {
    /// A marker boundary was reached
    fn trigger(&self, event: TriggerEvent);

    /// A new synchronization session started for this snapshot
    fn new_media(&self, snapshot: &PlaybackSnapshot) {
        let _ = snapshot;
    }

    /// Audio features of the newly started track are available
    fn media_features(&self, track_id: &TrackId, features: &AudioFeatures) {
        let _ = (track_id, features);
    }
}

/// Forwards every event to each of its sinks in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn trigger(&self, event: TriggerEvent) {
        for sink in &self.sinks {
            sink.trigger(event.clone());
        }
    }

    fn new_media(&self, snapshot: &PlaybackSnapshot) {
        for sink in &self.sinks {
            sink.new_media(snapshot);
        }
    }

    fn media_features(&self, track_id: &TrackId, features: &AudioFeatures) {
        for sink in &self.sinks {
            sink.media_features(track_id, features);
        }
    }
}
