//! Canonical weather condition codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical condition code, declared in strict severity order.
///
/// The derived `Ord` *is* the severity ordering: later variants are
/// more severe. Block aggregation takes the maximum, so a block
/// summary never under-reports risk (an hour of thunder inside an
/// otherwise clear afternoon surfaces as thunder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCode {
    Clear,
    Fair,
    PartlyCloudy,
    Cloudy,
    Fog,
    LightRain,
    Rain,
    Sleet,
    Snow,
    HeavyRain,
    Thunder,
    HeavyThunder,
}

impl ConditionCode {
    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCode::Clear => "clear",
            ConditionCode::Fair => "fair",
            ConditionCode::PartlyCloudy => "partly_cloudy",
            ConditionCode::Cloudy => "cloudy",
            ConditionCode::Fog => "fog",
            ConditionCode::LightRain => "light_rain",
            ConditionCode::Rain => "rain",
            ConditionCode::Sleet => "sleet",
            ConditionCode::Snow => "snow",
            ConditionCode::HeavyRain => "heavy_rain",
            ConditionCode::Thunder => "thunder",
            ConditionCode::HeavyThunder => "heavy_thunder",
        }
    }

    /// All codes, in severity order.
    pub const fn all() -> &'static [ConditionCode] {
        &[
            ConditionCode::Clear,
            ConditionCode::Fair,
            ConditionCode::PartlyCloudy,
            ConditionCode::Cloudy,
            ConditionCode::Fog,
            ConditionCode::LightRain,
            ConditionCode::Rain,
            ConditionCode::Sleet,
            ConditionCode::Snow,
            ConditionCode::HeavyRain,
            ConditionCode::Thunder,
            ConditionCode::HeavyThunder,
        ]
    }

    /// Fallback for provider codes with no known mapping.
    pub const fn generic_fallback() -> Self {
        ConditionCode::Cloudy
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
