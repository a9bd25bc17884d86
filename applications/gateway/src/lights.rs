//! Light strip driver
//!
//! Flashes the strip in a random colour on every trigger. Pixel output is
//! logged; no hardware backend is wired up.

use crate::config::LightSettings;
use lightbeat_core::{EventSink, TriggerEvent};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

pub struct LightStrip {
    pixels: usize,
    brightness: f32,
    flash: Duration,
    flashes: Arc<AtomicU64>,
}

impl LightStrip {
    pub fn new(settings: &LightSettings) -> Self {
        info!(
            pixels = settings.pixels,
            brightness = settings.brightness,
            "Light strip ready"
        );
        Self {
            pixels: settings.pixels,
            brightness: settings.brightness.clamp(0.0, 1.0),
            flash: Duration::from_millis(settings.flash_ms),
            flashes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of flashes completed so far
    pub fn flash_count(&self) -> u64 {
        self.flashes.load(Ordering::Relaxed)
    }
}

impl EventSink for LightStrip {
    fn trigger(&self, event: TriggerEvent) {
        let colour = Rgb::random(&mut rand::thread_rng());
        let pixels = self.pixels;
        let brightness = self.brightness;
        let flash = self.flash;
        let flashes = Arc::clone(&self.flashes);

        // Fire-and-forget; never delays the sync loop
        tokio::spawn(async move {
            debug!(
                index = event.marker_index,
                r = colour.r,
                g = colour.g,
                b = colour.b,
                pixels,
                brightness,
                "Flash on"
            );
            tokio::time::sleep(flash).await;
            debug!(index = event.marker_index, "Flash off");
            flashes.fetch_add(1, Ordering::Relaxed);
        });
    }
}
