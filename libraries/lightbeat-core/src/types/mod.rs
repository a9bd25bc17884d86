mod duration_ms;
mod event;
mod features;
mod ids;
mod marker;
mod playback;

pub use event::TriggerEvent;
pub use features::AudioFeatures;
pub use ids::TrackId;
pub use marker::{Granularity, Marker, MarkerList};
pub use playback::PlaybackSnapshot;
