//! Normalization of provider-native samples.
//!
//! Maps each provider's condition vocabulary through a per-provider
//! lookup table and converts native units to the canonical model
//! (°C, mm, m/s, degrees, probabilities in [0, 100]). Unknown codes
//! and other recoverable data-quality issues are logged and defaulted,
//! never surfaced as errors.

use tracing::warn;

use crate::domain::{ConditionCode, ForecastSample, ProviderId};

use super::raw::{RawSample, TemperatureUnit, WindSpeedUnit};

/// Normalize one provider-native sample into the canonical model.
///
/// Infallible: unmappable condition codes fall back to
/// [`ConditionCode::generic_fallback`] with a data-quality warning,
/// missing thunder probability defaults to 0, and a missing wind
/// direction stays absent (never guessed).
pub fn normalize(raw: &RawSample, provider: ProviderId) -> ForecastSample {
    let condition = match condition_for(provider, &raw.condition_code) {
        Some(code) => code,
        None => {
            warn!(
                provider = %provider,
                code = %raw.condition_code,
                "unknown condition code; using generic fallback"
            );
            ConditionCode::generic_fallback()
        }
    };

    ForecastSample {
        timestamp: raw.timestamp,
        temperature_c: to_celsius(raw.temperature, raw.temperature_unit),
        precipitation_mm: raw.precipitation_mm.max(0.0),
        precipitation_probability: ForecastSample::clamp_probability(
            raw.precipitation_probability.unwrap_or(0.0),
        ),
        wind_speed_mps: to_mps(raw.wind_speed, raw.wind_speed_unit),
        wind_direction_deg: raw.wind_direction_deg.map(|d| d.rem_euclid(360.0)),
        condition,
        thunder_probability: ForecastSample::clamp_probability(
            raw.thunder_probability.unwrap_or(0.0),
        ),
    }
}

fn to_celsius(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        TemperatureUnit::Kelvin => value - 273.15,
    }
}

fn to_mps(value: f64, unit: WindSpeedUnit) -> f64 {
    match unit {
        WindSpeedUnit::MetersPerSecond => value,
        WindSpeedUnit::KilometersPerHour => value / 3.6,
        WindSpeedUnit::MilesPerHour => value * 0.44704,
    }
}

fn condition_for(provider: ProviderId, code: &str) -> Option<ConditionCode> {
    match provider {
        ProviderId::Nordic => nordic_condition(code),
        ProviderId::Iberian => iberian_condition(code),
        ProviderId::Global => global_condition(code),
    }
}

/// Nordic numeric "smart symbol" codes.
fn nordic_condition(code: &str) -> Option<ConditionCode> {
    let condition = match code {
        "1" => ConditionCode::Clear,
        "2" => ConditionCode::Fair,
        "4" => ConditionCode::PartlyCloudy,
        "6" | "7" => ConditionCode::Cloudy,
        "9" => ConditionCode::Fog,
        "31" | "37" => ConditionCode::LightRain,
        "32" | "38" => ConditionCode::Rain,
        "33" | "39" => ConditionCode::HeavyRain,
        "41" | "42" | "43" => ConditionCode::Sleet,
        "51" | "52" | "53" | "57" | "58" => ConditionCode::Snow,
        "71" | "72" | "77" => ConditionCode::Thunder,
        "73" | "78" => ConditionCode::HeavyThunder,
        _ => return None,
    };
    Some(condition)
}

/// Iberian sky-state string codes.
fn iberian_condition(code: &str) -> Option<ConditionCode> {
    let condition = match code {
        "11" => ConditionCode::Clear,
        "12" => ConditionCode::Fair,
        "13" => ConditionCode::PartlyCloudy,
        "14" | "15" | "16" | "17" => ConditionCode::Cloudy,
        "81" | "82" => ConditionCode::Fog,
        "43" | "44" => ConditionCode::LightRain,
        "23" | "24" | "25" => ConditionCode::Rain,
        "26" | "27" => ConditionCode::HeavyRain,
        "33" | "34" => ConditionCode::Snow,
        "35" | "36" => ConditionCode::Sleet,
        "51" | "52" => ConditionCode::Thunder,
        "53" | "54" | "61" | "62" => ConditionCode::HeavyThunder,
        _ => return None,
    };
    Some(condition)
}

/// Global symbol strings; day/night/polar-twilight suffixes carry no
/// weather information and are stripped before lookup.
fn global_condition(code: &str) -> Option<ConditionCode> {
    let base = code
        .strip_suffix("_day")
        .or_else(|| code.strip_suffix("_night"))
        .or_else(|| code.strip_suffix("_polartwilight"))
        .unwrap_or(code);

    let condition = match base {
        "clearsky" => ConditionCode::Clear,
        "fair" => ConditionCode::Fair,
        "partlycloudy" => ConditionCode::PartlyCloudy,
        "cloudy" => ConditionCode::Cloudy,
        "fog" => ConditionCode::Fog,
        "lightrain" | "lightrainshowers" => ConditionCode::LightRain,
        "rain" | "rainshowers" => ConditionCode::Rain,
        "heavyrain" | "heavyrainshowers" => ConditionCode::HeavyRain,
        "sleet" | "sleetshowers" => ConditionCode::Sleet,
        "snow" | "snowshowers" | "heavysnow" => ConditionCode::Snow,
        "rainandthunder" | "lightrainandthunder" | "sleetandthunder" => ConditionCode::Thunder,
        "heavyrainandthunder" | "heavysleetandthunder" => ConditionCode::HeavyThunder,
        _ => return None,
    };
    Some(condition)
}
