//! Iberian meteorological service adapter.
//!
//! Covers the Iberian mainland and the Canary Islands through two
//! separate endpoints; the adapter picks the endpoint from its own
//! ordered sub-region list. The API authenticates via an `api_key`
//! query parameter and string-encodes most numeric fields; wind is
//! reported in km/h and sky state as numeric string codes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Coordinate, ProviderId};

use super::adapter::{ForecastAdapter, ProviderDescriptor};
use super::error::{FetchError, retry_after_hint};
use super::raw::{RawSample, TemperatureUnit, WindSpeedUnit};

const DEFAULT_BASE_URL: &str = "https://api.meteo-iberia.example/v2";

/// Sub-regions the Iberian provider distinguishes internally.
///
/// The router only decides that a coordinate belongs to this
/// provider; which endpoint serves it is the adapter's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IberianRegion {
    CanaryIslands,
    Mainland,
}

impl IberianRegion {
    /// Locate a coordinate within the provider's sub-regions.
    ///
    /// Ordered first-match: the Canary box is checked before the
    /// mainland catch-all.
    pub fn locate(coord: Coordinate) -> IberianRegion {
        let (lat, lon) = (coord.lat(), coord.lon());
        if (27.0..=29.5).contains(&lat) && (-18.5..=-13.0).contains(&lon) {
            IberianRegion::CanaryIslands
        } else {
            IberianRegion::Mainland
        }
    }

    fn path(&self) -> &'static str {
        match self {
            IberianRegion::CanaryIslands => "canarias",
            IberianRegion::Mainland => "peninsula",
        }
    }
}

/// Configuration for the Iberian adapter.
#[derive(Debug, Clone)]
pub struct IberianConfig {
    /// API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// Base URL (overridable for testing).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl IberianConfig {
    /// Create a config with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP adapter for the Iberian forecast API.
#[derive(Debug, Clone)]
pub struct IberianAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    descriptor: ProviderDescriptor,
}

impl IberianAdapter {
    /// Create a new adapter from config.
    pub fn new(config: IberianConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
            descriptor: ProviderDescriptor {
                min_call_interval: std::time::Duration::from_secs(90),
                max_horizon: Duration::hours(72),
                cache_ttl: Duration::hours(2),
                fine_horizon_hours: 24,
                fine_block: Duration::hours(1),
                coarse_block: Duration::hours(6),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct IberianResponse {
    horas: Vec<IberianHour>,
}

#[derive(Debug, Deserialize)]
struct IberianHour {
    #[serde(rename = "fecha")]
    time: DateTime<Utc>,
    #[serde(rename = "temperatura")]
    temperature: String,
    #[serde(rename = "precipitacion")]
    precipitation: String,
    #[serde(default, rename = "probPrecipitacion")]
    precipitation_probability: Option<String>,
    #[serde(rename = "viento")]
    wind_speed_kmh: String,
    #[serde(default, rename = "direccionViento")]
    wind_direction: Option<String>,
    #[serde(rename = "estadoCielo")]
    sky: String,
    #[serde(default, rename = "probTormenta")]
    thunder: Option<String>,
}

impl IberianHour {
    /// Convert one wire hour to a raw sample.
    ///
    /// Returns `None` (with a data-quality warning) when a mandatory
    /// numeric field is unparsable; optional fields degrade to absent
    /// instead.
    fn into_raw(self) -> Option<RawSample> {
        let temperature = parse_numeric(&self.temperature);
        let precipitation = parse_numeric(&self.precipitation);
        let wind_speed = parse_numeric(&self.wind_speed_kmh);

        let (Some(temperature), Some(precipitation), Some(wind_speed)) =
            (temperature, precipitation, wind_speed)
        else {
            warn!(
                provider = %ProviderId::Iberian,
                time = %self.time,
                "dropping sample with unparsable mandatory numeric field"
            );
            return None;
        };

        Some(RawSample {
            timestamp: self.time,
            temperature,
            temperature_unit: TemperatureUnit::Celsius,
            precipitation_mm: precipitation,
            precipitation_probability: self
                .precipitation_probability
                .as_deref()
                .and_then(parse_numeric),
            wind_speed,
            wind_speed_unit: WindSpeedUnit::KilometersPerHour,
            wind_direction_deg: self.wind_direction.as_deref().and_then(parse_numeric),
            condition_code: self.sky,
            thunder_probability: self.thunder.as_deref().and_then(parse_numeric),
        })
    }
}

/// Lenient parse for the API's string-encoded numerics ("12", "12,5",
/// " 12.5 ").
fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse().ok()
}

#[async_trait::async_trait]
impl ForecastAdapter for IberianAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Iberian
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_raw(
        &self,
        coord: Coordinate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>, FetchError> {
        let region = IberianRegion::locate(coord);
        let url = format!("{}/prediccion/{}/horaria", self.base_url, region.path());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("inicio", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("fin", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_hint(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), body, retry_after));
        }

        let parsed: IberianResponse = response.json().await?;
        Ok(parsed
            .horas
            .into_iter()
            .filter_map(IberianHour::into_raw)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canary_box_takes_precedence() {
        let tenerife = Coordinate::new(28.0, -16.5).unwrap();
        assert_eq!(
            IberianRegion::locate(tenerife),
            IberianRegion::CanaryIslands
        );

        let madrid = Coordinate::new(40.42, -3.70).unwrap();
        assert_eq!(IberianRegion::locate(madrid), IberianRegion::Mainland);
    }

    #[test]
    fn region_paths() {
        assert_eq!(IberianRegion::CanaryIslands.path(), "canarias");
        assert_eq!(IberianRegion::Mainland.path(), "peninsula");
    }

    #[test]
    fn parse_numeric_variants() {
        assert_eq!(parse_numeric("12"), Some(12.0));
        assert_eq!(parse_numeric("12.5"), Some(12.5));
        assert_eq!(parse_numeric("12,5"), Some(12.5));
        assert_eq!(parse_numeric(" 12.5 "), Some(12.5));
        assert_eq!(parse_numeric("n/a"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn parses_string_encoded_payload() {
        let json = r#"{
            "horas": [
                {
                    "fecha": "2026-06-01T12:00:00Z",
                    "temperatura": "21,4",
                    "precipitacion": "0",
                    "probPrecipitacion": "15",
                    "viento": "18",
                    "direccionViento": "90",
                    "estadoCielo": "12",
                    "probTormenta": "0"
                }
            ]
        }"#;

        let parsed: IberianResponse = serde_json::from_str(json).unwrap();
        let raw: Vec<RawSample> = parsed
            .horas
            .into_iter()
            .filter_map(IberianHour::into_raw)
            .collect();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].temperature, 21.4);
        assert_eq!(raw[0].wind_speed, 18.0);
        assert_eq!(raw[0].wind_speed_unit, WindSpeedUnit::KilometersPerHour);
        assert_eq!(raw[0].condition_code, "12");
    }

    #[test]
    fn unparsable_mandatory_field_drops_sample() {
        let json = r#"{
            "horas": [
                {
                    "fecha": "2026-06-01T12:00:00Z",
                    "temperatura": "??",
                    "precipitacion": "0",
                    "viento": "18",
                    "estadoCielo": "12"
                },
                {
                    "fecha": "2026-06-01T13:00:00Z",
                    "temperatura": "20",
                    "precipitacion": "0",
                    "viento": "15",
                    "estadoCielo": "11"
                }
            ]
        }"#;

        let parsed: IberianResponse = serde_json::from_str(json).unwrap();
        let raw: Vec<RawSample> = parsed
            .horas
            .into_iter()
            .filter_map(IberianHour::into_raw)
            .collect();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].temperature, 20.0);
    }

    #[test]
    fn unparsable_optional_field_stays_absent() {
        let json = r#"{
            "horas": [
                {
                    "fecha": "2026-06-01T12:00:00Z",
                    "temperatura": "20",
                    "precipitacion": "0",
                    "probPrecipitacion": "n/a",
                    "viento": "15",
                    "estadoCielo": "11"
                }
            ]
        }"#;

        let parsed: IberianResponse = serde_json::from_str(json).unwrap();
        let raw = parsed.horas.into_iter().filter_map(IberianHour::into_raw);
        let raw: Vec<RawSample> = raw.collect();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].precipitation_probability, None);
    }
}
