//! Per-track audio features

use serde::{Deserialize, Serialize};

/// High-level descriptors of a track, forwarded to downstream consumers
/// when a new track starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Estimated tempo in beats per minute
    #[serde(default)]
    pub tempo: f64,
    /// Perceptual intensity, 0.0 to 1.0
    #[serde(default)]
    pub energy: f64,
    /// Suitability for dancing, 0.0 to 1.0
    #[serde(default)]
    pub danceability: f64,
    /// Musical positiveness, 0.0 to 1.0
    #[serde(default)]
    pub valence: f64,
    /// Overall loudness in dB
    #[serde(default)]
    pub loudness: f64,
    /// Pitch class of the key (-1 when undetected)
    #[serde(default = "undetected_key")]
    pub key: i32,
    /// 1 = major, 0 = minor
    #[serde(default)]
    pub mode: i32,
    /// Beats per bar
    #[serde(default)]
    pub time_signature: i32,
}

fn undetected_key() -> i32 {
    -1
}
