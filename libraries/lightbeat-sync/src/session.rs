use crate::locator::locate;
use crate::types::{SessionOptions, SessionOutcome};
use lightbeat_core::{EventSink, MarkerList, TrackId, TriggerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A running sync loop for one track.
///
/// Owns the cancellation token and the task handle. Dropping the session
/// cancels the loop; `stop` additionally waits for the task to finish so
/// two loops never overlap.
pub struct SyncSession {
    track_id: TrackId,
    cancel: CancellationToken,
    handle: JoinHandle<SessionOutcome>,
}

impl SyncSession {
    /// Locate the starting marker for `progress` and spawn the loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        track_id: TrackId,
        markers: Arc<MarkerList>,
        progress: Duration,
        sink: Arc<dyn EventSink>,
        options: SessionOptions,
    ) -> Self {
        let cancel = CancellationToken::new();
        let sync_loop = SyncLoop {
            track_id: track_id.clone(),
            markers,
            sink,
            options,
        };

        let token = cancel.clone();
        let handle = tokio::spawn(async move { sync_loop.run(progress, token).await });

        Self {
            track_id,
            cancel,
            handle,
        }
    }

    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    /// Whether the loop has already exhausted or been cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal cancellation without waiting
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel the loop and wait until it has fully stopped.
    pub async fn stop(mut self) -> SessionOutcome {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the loop to end on its own.
    pub async fn wait(mut self) -> SessionOutcome {
        self.join().await
    }

    async fn join(&mut self) -> SessionOutcome {
        match (&mut self.handle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(track_id = %self.track_id, error = %e, "Sync loop task failed");
                SessionOutcome::Cancelled { fired: 0 }
            }
        }
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// State owned by the spawned loop
struct SyncLoop {
    track_id: TrackId,
    markers: Arc<MarkerList>,
    sink: Arc<dyn EventSink>,
    options: SessionOptions,
}

impl SyncLoop {
    async fn run(self, progress: Duration, cancel: CancellationToken) -> SessionOutcome {
        let last = self.markers.last_index();
        let location = locate(&self.markers, progress);

        let first_wait = match location.time_to_fire {
            Some(wait) => wait,
            None if self.options.fire_final_marker => {
                self.markers[last].end().saturating_sub(progress)
            }
            None => {
                debug!(
                    track_id = %self.track_id,
                    "Positioned on final marker, nothing to schedule"
                );
                return SessionOutcome::Exhausted { fired: 0 };
            }
        };

        info!(
            track_id = %self.track_id,
            granularity = %self.markers.granularity(),
            markers = self.markers.len(),
            start_index = location.index,
            first_wait_ms = first_wait.as_millis() as u64,
            "Tracking markers"
        );

        let mut index = location.index;
        let mut fired = 0;
        let mut deadline = Instant::now() + first_wait;

        loop {
            // Waiting
            if !wait_until(deadline, &cancel).await {
                debug!(track_id = %self.track_id, index, fired, "Sync loop cancelled");
                return SessionOutcome::Cancelled { fired };
            }

            // Firing
            self.fire(index);
            fired += 1;

            if index >= last {
                break;
            }
            index += 1;
            deadline += self.markers[index].duration;

            // The final interval is waited out but not fired unless configured
            if index == last && !self.options.fire_final_marker {
                if !wait_until(deadline, &cancel).await {
                    debug!(track_id = %self.track_id, index, fired, "Sync loop cancelled");
                    return SessionOutcome::Cancelled { fired };
                }
                break;
            }
        }

        info!(track_id = %self.track_id, fired, "Marker list exhausted");
        SessionOutcome::Exhausted { fired }
    }

    fn fire(&self, index: usize) {
        let event = TriggerEvent {
            track_id: self.track_id.clone(),
            marker_index: index,
            marker_duration: self.markers[index].duration,
            granularity: self.markers.granularity(),
        };
        debug!(track_id = %self.track_id, index, "Trigger");
        self.sink.trigger(event);
    }
}

/// Sleep until `deadline`, returning `false` if cancelled first.
///
/// Cancellation is checked before the timer so an already-cancelled token
/// never lets a trigger through.
async fn wait_until(deadline: Instant, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = tokio::time::sleep_until(deadline) => true,
    }
}
