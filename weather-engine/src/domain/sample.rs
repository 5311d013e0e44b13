//! Forecast samples and blocks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ConditionCode;

/// A single normalized forecast reading at one instant.
///
/// All values are in canonical SI-derived units: °C, mm, m/s, degrees.
/// Probabilities are within [0, 100]. Samples are immutable once
/// constructed; aggregation produces new values rather than mutating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Target instant of the reading (always timezone-aware).
    pub timestamp: DateTime<Utc>,
    /// Air temperature in °C.
    pub temperature_c: f64,
    /// Precipitation amount in mm.
    pub precipitation_mm: f64,
    /// Probability of precipitation, 0–100.
    pub precipitation_probability: u8,
    /// Wind speed in m/s.
    pub wind_speed_mps: f64,
    /// Wind direction in degrees [0, 360), if the provider reported
    /// one. Never guessed when absent.
    pub wind_direction_deg: Option<f64>,
    /// Canonical condition code.
    pub condition: ConditionCode,
    /// Probability of thunder, 0–100. Defaults to 0 when the provider
    /// does not report it.
    pub thunder_probability: u8,
}

impl ForecastSample {
    /// Clamp a raw probability value into the [0, 100] invariant.
    pub fn clamp_probability(value: f64) -> u8 {
        if value.is_finite() {
            value.clamp(0.0, 100.0).round() as u8
        } else {
            0
        }
    }
}

/// A forecast over the contiguous span `[start, start + block_size)`.
///
/// Built by folding one or more samples; never synthesized from zero
/// samples (empty spans are simply absent from result sequences).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBlock {
    /// Start of the span.
    pub start: DateTime<Utc>,
    /// Length of the span; always positive.
    #[serde(with = "duration_seconds")]
    pub block_size: Duration,
    /// Representative forecast for the span.
    pub sample: ForecastSample,
}

impl ForecastBlock {
    /// Exclusive end of the span.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.block_size
    }

    /// Whether an instant falls inside the span.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end()
    }
}

/// Serialize `chrono::Duration` as whole seconds for the cache file.
mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::seconds)
    }
}
