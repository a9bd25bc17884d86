//! Common test fakes for the sync engine
#![allow(dead_code)]

use async_trait::async_trait;
use lightbeat_core::{
    AnalysisSource, AudioFeatures, EventSink, Granularity, LightBeatError, Marker, MarkerList,
    PlaybackSnapshot, PlaybackSource, Result, TrackId, TriggerEvent,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn snap(track: &str, playing: bool, progress_ms: u64) -> PlaybackSnapshot {
    PlaybackSnapshot::new(track, playing, ms(progress_ms))
}

/// Evenly spaced markers of `step_ms` covering `count` intervals
pub fn even_markers(count: usize, step_ms: u64) -> Vec<Marker> {
    (0..count as u64)
        .map(|i| Marker::new(ms(i * step_ms), ms(step_ms)))
        .collect()
}

/// Playback source returning scripted responses, then repeating the last one
#[derive(Default)]
pub struct ScriptedPlayback {
    script: Mutex<VecDeque<Result<Option<PlaybackSnapshot>>>>,
    last: Mutex<Option<PlaybackSnapshot>>,
    pub calls: AtomicUsize,
}

impl ScriptedPlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, snapshot: PlaybackSnapshot) {
        self.script.lock().unwrap().push_back(Ok(Some(snapshot)));
    }

    pub fn push_none(&self) {
        self.script.lock().unwrap().push_back(Ok(None));
    }

    pub fn push_error(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(LightBeatError::network("connection reset")));
    }
}

#[async_trait]
impl PlaybackSource for ScriptedPlayback {
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

/// Analysis source backed by a map of track -> markers
#[derive(Default)]
pub struct FakeAnalysis {
    tracks: Mutex<HashMap<String, Vec<Marker>>>,
    failing: Mutex<bool>,
    pub marker_calls: AtomicUsize,
    pub feature_calls: AtomicUsize,
    pub requested: Mutex<Vec<Granularity>>,
}

impl FakeAnalysis {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, track: &str, markers: Vec<Marker>) {
        self.tracks
            .lock()
            .unwrap()
            .insert(track.to_string(), markers);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn marker_calls(&self) -> usize {
        self.marker_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisSource for FakeAnalysis {
    async fn marker_list(
        &self,
        track_id: &TrackId,
        granularity: Granularity,
    ) -> Result<MarkerList> {
        self.marker_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(granularity);
        if *self.failing.lock().unwrap() {
            return Err(LightBeatError::network("analysis unavailable"));
        }
        let markers = self
            .tracks
            .lock()
            .unwrap()
            .get(track_id.as_str())
            .cloned()
            .unwrap_or_default();
        MarkerList::new(granularity, markers)
    }

    async fn audio_features(&self, _track_id: &TrackId) -> Result<AudioFeatures> {
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AudioFeatures {
            tempo: 120.0,
            ..AudioFeatures::default()
        })
    }
}

/// Sink recording everything it receives
#[derive(Default)]
pub struct RecordingSink {
    pub triggers: Mutex<Vec<TriggerEvent>>,
    pub media: Mutex<Vec<PlaybackSnapshot>>,
    pub features: Mutex<Vec<(TrackId, AudioFeatures)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.lock().unwrap().len()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.triggers
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.marker_index)
            .collect()
    }

    pub fn tracks(&self) -> Vec<String> {
        self.triggers
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.track_id.to_string())
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn trigger(&self, event: TriggerEvent) {
        self.triggers.lock().unwrap().push(event);
    }

    fn new_media(&self, snapshot: &PlaybackSnapshot) {
        self.media.lock().unwrap().push(snapshot.clone());
    }

    fn media_features(&self, track_id: &TrackId, features: &AudioFeatures) {
        self.features
            .lock()
            .unwrap()
            .push((track_id.clone(), features.clone()));
    }
}
