/// Common test utilities and fixtures
use axum::Router;
use lightbeat_core::Granularity;
use lightbeat_gateway::{api, AppState, EventBus};
use tokio::sync::watch;

pub struct TestApp {
    pub router: Router,
    pub bus: EventBus,
    pub granularity: watch::Receiver<Granularity>,
}

/// Router wired to a fresh bus and granularity channel
pub fn create_test_app() -> TestApp {
    let bus = EventBus::new(16);
    let (tx, rx) = watch::channel(Granularity::Beat);
    let state = AppState::new(bus.clone(), tx);

    TestApp {
        router: api::router(state),
        bus,
        granularity: rx,
    }
}
