use crate::cache::MarkerCache;
use crate::detector::ChangeDetector;
use crate::error::{Result, SyncError};
use crate::session::SyncSession;
use crate::types::{CycleOutcome, SessionOptions, SessionOutcome, SyncConfig};
use lightbeat_core::{
    AnalysisSource, EventSink, Granularity, MarkerList, PlaybackSnapshot, PlaybackSource, TrackId,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed-interval scheduler feeding playback snapshots through the change
/// detector and keeping at most one `SyncSession` alive.
///
/// The driver is the only owner of the active session. It never touches a
/// running loop except to cancel it, and always waits for the old loop to
/// stop before launching a replacement.
pub struct PollDriver<P, A> {
    playback: P,
    analysis: A,
    sink: Arc<dyn EventSink>,
    granularity: watch::Receiver<Granularity>,
    config: SyncConfig,
    detector: ChangeDetector,
    cache: MarkerCache,
    previous: PlaybackSnapshot,
    session: Option<SyncSession>,
    /// Track whose loop ran out of markers; stays synced until the next change
    exhausted: Option<TrackId>,
}

impl<P: PlaybackSource, A: AnalysisSource> PollDriver<P, A> {
    pub fn new(
        playback: P,
        analysis: A,
        sink: Arc<dyn EventSink>,
        granularity: watch::Receiver<Granularity>,
        config: SyncConfig,
    ) -> Self {
        Self {
            playback,
            analysis,
            sink,
            granularity,
            detector: ChangeDetector::new(config.poll_interval, config.seek_slack),
            cache: MarkerCache::new(config.cache_capacity),
            config,
            previous: PlaybackSnapshot::empty(),
            session: None,
            exhausted: None,
        }
    }

    /// Snapshot the next cycle compares against
    pub fn previous(&self) -> &PlaybackSnapshot {
        &self.previous
    }

    /// Whether a sync loop is currently running
    pub fn session_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_finished())
    }

    /// Track of the running sync loop, if any
    pub fn active_track(&self) -> Option<&TrackId> {
        self.session
            .as_ref()
            .filter(|s| !s.is_finished())
            .map(SyncSession::track_id)
    }

    /// Whether `track_id` is covered by a running or exhausted loop
    fn synced(&self, track_id: &TrackId) -> bool {
        self.session_active() || self.exhausted.as_ref() == Some(track_id)
    }

    /// Seed `previous` with an initial fetch so the first tick has
    /// something to compare against.
    pub async fn prime(&mut self) {
        match self.fetch_playback().await {
            Ok(Some(snapshot)) if snapshot.has_track() => {
                debug!(track_id = %snapshot.track_id, "Primed with current playback");
                self.previous = snapshot;
            }
            Ok(_) => debug!("Nothing playing at startup"),
            Err(e) => warn!(error = %e, "Initial playback fetch failed"),
        }
    }

    /// Run one poll cycle.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        let fetched_at = Instant::now();
        let current = match self.fetch_playback().await {
            Ok(Some(snapshot)) if snapshot.has_track() => snapshot,
            Ok(_) => {
                debug!("Nothing playing, skipping cycle");
                return CycleOutcome::Skipped;
            }
            Err(e) => {
                warn!(error = %e, "Skipping cycle");
                return CycleOutcome::Skipped;
            }
        };

        self.reap_finished().await;

        let decision = self
            .detector
            .decide(&self.previous, &current, self.synced(&current.track_id));

        if decision.is_no_action() {
            self.previous = current;
            return CycleOutcome::Unchanged;
        }

        self.exhausted = None;

        let mut stopped = false;
        if decision.stop {
            info!(cause = ?decision.cause, track_id = %current.track_id, "Stopping");
            self.stop_session().await;
            stopped = true;
        }

        // A paused player gets no loop; resume starts one
        if decision.start && !current.is_playing {
            debug!(
                cause = ?decision.cause,
                track_id = %current.track_id,
                "Paused, deferring start"
            );
            self.previous = current;
            return if stopped {
                CycleOutcome::Stopped
            } else {
                CycleOutcome::Unchanged
            };
        }

        if decision.start {
            info!(cause = ?decision.cause, track_id = %current.track_id, "Starting");
            if let Err(e) = self.start_session(&current, fetched_at).await {
                warn!(error = %e, "Could not start sync session, will retry next cycle");
                return CycleOutcome::StartFailed;
            }
            self.previous = current;
            return if stopped {
                CycleOutcome::Restarted
            } else {
                CycleOutcome::Started
            };
        }

        self.previous = current;
        CycleOutcome::Stopped
    }

    /// Poll until `shutdown` is cancelled, then stop the active session.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Starting poll driver"
        );

        self.prime().await;

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break,
                        outcome = self.poll_once() => debug!(?outcome, "Poll cycle complete"),
                    }
                }
            }
        }

        self.shutdown().await;
        info!("Poll driver stopped");
    }

    /// Stop the active session, if any.
    pub async fn shutdown(&mut self) {
        self.stop_session().await;
    }

    async fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            let track_id = session.track_id().clone();
            let outcome = session.stop().await;
            debug!(track_id = %track_id, fired = outcome.fired(), "Sync session stopped");
        }
    }

    /// Drop a session whose loop already ended on its own, remembering its
    /// track if it ran out of markers.
    async fn reap_finished(&mut self) {
        if self.session.as_ref().is_some_and(SyncSession::is_finished) {
            if let Some(session) = self.session.take() {
                let track_id = session.track_id().clone();
                let outcome = session.wait().await;
                debug!(track_id = %track_id, ?outcome, "Sync session ended");
                if matches!(outcome, SessionOutcome::Exhausted { .. }) {
                    self.exhausted = Some(track_id);
                }
            }
        }
    }

    async fn start_session(
        &mut self,
        current: &PlaybackSnapshot,
        fetched_at: Instant,
    ) -> Result<()> {
        let track_id = current.track_id.clone();
        let granularity = *self.granularity.borrow();

        let markers = self.marker_list(&track_id, granularity).await?;

        // Never two loops at once
        self.stop_session().await;

        self.sink.new_media(current);

        // Account for the time spent fetching since the snapshot was taken
        let progress = current.progress + fetched_at.elapsed();

        self.session = Some(SyncSession::start(
            track_id.clone(),
            markers,
            progress,
            Arc::clone(&self.sink),
            SessionOptions {
                fire_final_marker: self.config.fire_final_marker,
            },
        ));

        self.publish_features(&track_id).await;
        Ok(())
    }

    async fn marker_list(
        &mut self,
        track_id: &TrackId,
        granularity: Granularity,
    ) -> Result<Arc<MarkerList>> {
        if let Some(markers) = self.cache.get(track_id, granularity) {
            debug!(track_id = %track_id, %granularity, "Marker list cache hit");
            return Ok(markers);
        }

        let markers = bounded(
            "Analysis fetch",
            self.config,
            self.analysis.marker_list(track_id, granularity),
        )
        .await?
        .map_err(|e| SyncError::analysis(track_id, e))?;

        let markers = Arc::new(markers);
        self.cache
            .insert(track_id.clone(), granularity, Arc::clone(&markers));
        Ok(markers)
    }

    async fn publish_features(&self, track_id: &TrackId) {
        match bounded(
            "Features fetch",
            self.config,
            self.analysis.audio_features(track_id),
        )
        .await
        {
            Ok(Ok(features)) => self.sink.media_features(track_id, &features),
            Ok(Err(e)) => warn!(track_id = %track_id, error = %e, "Audio features unavailable"),
            Err(e) => warn!(track_id = %track_id, error = %e, "Audio features unavailable"),
        }
    }

    async fn fetch_playback(&self) -> Result<Option<PlaybackSnapshot>> {
        bounded(
            "Playback fetch",
            self.config,
            self.playback.current_playback(),
        )
        .await?
        .map_err(SyncError::FetchFailure)
    }
}

/// Apply the configured fetch timeout to a collaborator call.
async fn bounded<T>(
    operation: &'static str,
    config: SyncConfig,
    fut: impl Future<Output = T>,
) -> Result<T> {
    tokio::time::timeout(config.fetch_timeout, fut)
        .await
        .map_err(|_| SyncError::Timeout {
            operation,
            timeout: config.fetch_timeout,
        })
}
