//! Global fallback forecast adapter.
//!
//! Worldwide coverage at lower fidelity than the regional sources;
//! the router sends every coordinate no regional provider claims
//! here. Reports Kelvin temperatures, m/s wind, and symbol strings
//! with day/night suffixes (e.g. `clearsky_day`).

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::{Coordinate, ProviderId};

use super::adapter::{ForecastAdapter, ProviderDescriptor};
use super::error::{FetchError, retry_after_hint};
use super::raw::{RawSample, TemperatureUnit, WindSpeedUnit};

const DEFAULT_BASE_URL: &str = "https://api.worldforecast.example/v1";

/// The API requires an identifying User-Agent.
const DEFAULT_USER_AGENT: &str = concat!("weather-engine/", env!("CARGO_PKG_VERSION"));

/// Configuration for the global adapter.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    /// API key, sent in the `x-api-key` header.
    pub api_key: String,
    /// Base URL (overridable for testing).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GlobalConfig {
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

/// HTTP adapter for the global forecast API.
#[derive(Debug, Clone)]
pub struct GlobalAdapter {
    http: reqwest::Client,
    base_url: String,
    descriptor: ProviderDescriptor,
}

impl GlobalAdapter {
    /// Create a new adapter from config.
    pub fn new(config: GlobalConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            FetchError::Permanent {
                message: "invalid API key format".to_string(),
            }
        })?;
        headers.insert("x-api-key", api_key);
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            descriptor: ProviderDescriptor {
                min_call_interval: std::time::Duration::from_secs(30),
                max_horizon: Duration::days(9),
                cache_ttl: Duration::minutes(30),
                fine_horizon_hours: 60,
                fine_block: Duration::hours(1),
                coarse_block: Duration::hours(6),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    timeseries: Vec<GlobalPoint>,
}

#[derive(Debug, Deserialize)]
struct GlobalPoint {
    time: DateTime<Utc>,
    air_temperature_k: f64,
    precipitation_amount: f64,
    #[serde(default)]
    precipitation_probability: Option<f64>,
    wind_speed: f64,
    #[serde(default)]
    wind_from_direction: Option<f64>,
    symbol_code: String,
    #[serde(default)]
    probability_of_thunder: Option<f64>,
}

impl GlobalPoint {
    fn into_raw(self) -> RawSample {
        RawSample {
            timestamp: self.time,
            temperature: self.air_temperature_k,
            temperature_unit: TemperatureUnit::Kelvin,
            precipitation_mm: self.precipitation_amount,
            precipitation_probability: self.precipitation_probability,
            wind_speed: self.wind_speed,
            wind_speed_unit: WindSpeedUnit::MetersPerSecond,
            wind_direction_deg: self.wind_from_direction,
            condition_code: self.symbol_code,
            thunder_probability: self.probability_of_thunder,
        }
    }
}

#[async_trait::async_trait]
impl ForecastAdapter for GlobalAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Global
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
        let url = format!("{}/complete", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("from", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("to", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_hint(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), body, retry_after));
        }

        let parsed: GlobalResponse = response.json().await?;
        Ok(parsed
            .timeseries
            .into_iter()
            .map(GlobalPoint::into_raw)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_creation() {
        let adapter = GlobalAdapter::new(GlobalConfig::new("key")).unwrap();
        assert_eq!(adapter.id(), ProviderId::Global);
        assert_eq!(adapter.descriptor().coarse_block, Duration::hours(6));
    }

    #[test]
    fn parses_native_payload() {
        let json = r#"{
            "timeseries": [
                {
                    "time": "2026-06-01T12:00:00Z",
                    "air_temperature_k": 287.15,
                    "precipitation_amount": 0.4,
                    "precipitation_probability": 40.0,
                    "wind_speed": 5.2,
                    "wind_from_direction": 310.0,
                    "symbol_code": "lightrain_day",
                    "probability_of_thunder": 2.0
                }
            ]
        }"#;

        let parsed: GlobalResponse = serde_json::from_str(json).unwrap();
        let raw: Vec<RawSample> = parsed
            .timeseries
            .into_iter()
            .map(GlobalPoint::into_raw)
            .collect();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].temperature, 287.15);
        assert_eq!(raw[0].temperature_unit, TemperatureUnit::Kelvin);
        assert_eq!(raw[0].condition_code, "lightrain_day");
    }
}
