//! Provider-native sample representation.

use chrono::{DateTime, Utc};

/// Temperature unit a provider reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

/// Wind speed unit a provider reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSpeedUnit {
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

/// A single provider-native reading, before normalization.
///
/// Values stay in the provider's units and condition vocabulary; only
/// [`super::normalize`] interprets them. Optional fields are exactly
/// the ones providers commonly omit; the normalizer applies the
/// documented defaults, never the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Target instant of the reading.
    pub timestamp: DateTime<Utc>,
    /// Temperature in `temperature_unit`.
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    /// Precipitation amount in mm (every known provider uses mm).
    pub precipitation_mm: f64,
    /// Probability of precipitation, 0–100, if reported.
    pub precipitation_probability: Option<f64>,
    /// Wind speed in `wind_speed_unit`.
    pub wind_speed: f64,
    pub wind_speed_unit: WindSpeedUnit,
    /// Wind direction in degrees, if reported.
    pub wind_direction_deg: Option<f64>,
    /// Provider-native condition code (numeric codes are carried as
    /// their string form).
    pub condition_code: String,
    /// Probability of thunder, 0–100, if reported.
    pub thunder_probability: Option<f64>,
}
