/// Timing markers (beats, bars, tatums) for a single track
use crate::error::{LightBeatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which interval kind of the track analysis to synchronize against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One marker per beat
    #[default]
    Beat,
    /// One marker per bar
    Bar,
    /// One marker per tatum (the smallest regular pulse)
    Tatum,
}

impl Granularity {
    /// Wire name, as used in configuration and control messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Beat => "beat",
            Granularity::Bar => "bar",
            Granularity::Tatum => "tatum",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = LightBeatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beat" | "beats" => Ok(Granularity::Beat),
            "bar" | "bars" => Ok(Granularity::Bar),
            "tatum" | "tatums" => Ok(Granularity::Tatum),
            other => Err(LightBeatError::UnknownGranularity(other.to_string())),
        }
    }
}

/// One beat/bar interval of a track's timing analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Offset from the start of the track
    pub start: Duration,
    /// Length of the interval (always > 0 inside a `MarkerList`)
    pub duration: Duration,
}

impl Marker {
    pub fn new(start: Duration, duration: Duration) -> Self {
        Self { start, duration }
    }

    /// Build a marker from the analysis service's fractional seconds.
    ///
    /// Returns `None` for negative, non-finite or zero-length intervals.
    pub fn from_secs_f64(start: f64, duration: f64) -> Option<Self> {
        let start = Duration::try_from_secs_f64(start).ok()?;
        let duration = Duration::try_from_secs_f64(duration).ok()?;
        if duration.is_zero() {
            return None;
        }
        Some(Self { start, duration })
    }

    /// Offset where this interval ends
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Ordered, validated marker sequence for one track
///
/// Immutable once built. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerList {
    granularity: Granularity,
    markers: Vec<Marker>,
}

impl MarkerList {
    /// Validate and wrap a marker sequence.
    ///
    /// # Errors
    /// `MalformedMarkerList` when the sequence is empty, contains a
    /// zero-length marker, or is not ordered by start offset.
    pub fn new(granularity: Granularity, markers: Vec<Marker>) -> Result<Self> {
        if markers.is_empty() {
            return Err(LightBeatError::malformed(format!(
                "no {} markers in analysis",
                granularity
            )));
        }

        if let Some(index) = markers.iter().position(|m| m.duration.is_zero()) {
            return Err(LightBeatError::malformed(format!(
                "marker {} has zero duration",
                index
            )));
        }

        if let Some(index) = markers.windows(2).position(|w| w[1].start < w[0].start) {
            return Err(LightBeatError::malformed(format!(
                "marker {} starts before marker {}",
                index + 1,
                index
            )));
        }

        Ok(Self {
            granularity,
            markers,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    /// Index of the final marker
    pub fn last_index(&self) -> usize {
        self.markers.len() - 1
    }
}

impl std::ops::Index<usize> for MarkerList {
    type Output = Marker;

    fn index(&self, index: usize) -> &Marker {
        &self.markers[index]
    }
}
