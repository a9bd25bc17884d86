/// Shared application state
use crate::bus::EventBus;
use crate::control::ControlRouter;
use lightbeat_core::Granularity;
use std::sync::Arc;
use tokio::sync::watch;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub bus: EventBus,
    pub control: Arc<ControlRouter>,
    pub granularity: watch::Receiver<Granularity>,
}

impl AppState {
    /// Build the state around the granularity channel the driver reads.
    pub fn new(bus: EventBus, granularity: watch::Sender<Granularity>) -> Self {
        let receiver = granularity.subscribe();
        Self {
            bus,
            control: Arc::new(ControlRouter::new(granularity)),
            granularity: receiver,
        }
    }
}
