//! Nordic meteorological service adapter.
//!
//! Covers Fennoscandia with hourly resolution up to 48 hours of lead
//! time and six-hour resolution beyond. Reports °C and m/s natively
//! and uses numeric "smart symbol" condition codes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::domain::{Coordinate, ProviderId};

use super::adapter::{ForecastAdapter, ProviderDescriptor};
use super::error::{FetchError, retry_after_hint};
use super::raw::{RawSample, TemperatureUnit, WindSpeedUnit};

const DEFAULT_BASE_URL: &str = "https://api.weather-nordic.example/v1";

/// Configuration for the Nordic adapter.
#[derive(Debug, Clone)]
pub struct NordicConfig {
    /// API key, sent in the `x-api-key` header.
    pub api_key: String,
    /// Base URL (overridable for testing).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl NordicConfig {
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

/// HTTP adapter for the Nordic forecast API.
#[derive(Debug, Clone)]
pub struct NordicAdapter {
    http: reqwest::Client,
    base_url: String,
    descriptor: ProviderDescriptor,
}

impl NordicAdapter {
    /// Create a new adapter from config.
    pub fn new(config: NordicConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            FetchError::Permanent {
                message: "invalid API key format".to_string(),
            }
        })?;
        headers.insert("x-api-key", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            descriptor: ProviderDescriptor {
                min_call_interval: std::time::Duration::from_secs(60),
                max_horizon: Duration::days(10),
                cache_ttl: Duration::hours(1),
                fine_horizon_hours: 48,
                fine_block: Duration::hours(1),
                coarse_block: Duration::hours(6),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct NordicResponse {
    series: Vec<NordicPoint>,
}

#[derive(Debug, Deserialize)]
struct NordicPoint {
    time: DateTime<Utc>,
    #[serde(rename = "t2m")]
    temperature: f64,
    #[serde(rename = "precipitation1h")]
    precipitation: f64,
    #[serde(default, rename = "pop")]
    precipitation_probability: Option<f64>,
    #[serde(rename = "windspeedms")]
    wind_speed: f64,
    #[serde(default, rename = "winddirection")]
    wind_direction: Option<f64>,
    #[serde(rename = "smartsymbol")]
    symbol: i64,
    #[serde(default, rename = "probabilitythunderstorm")]
    thunder: Option<f64>,
}

impl NordicPoint {
    fn into_raw(self) -> RawSample {
        RawSample {
            timestamp: self.time,
            temperature: self.temperature,
            temperature_unit: TemperatureUnit::Celsius,
            precipitation_mm: self.precipitation,
            precipitation_probability: self.precipitation_probability,
            wind_speed: self.wind_speed,
            wind_speed_unit: WindSpeedUnit::MetersPerSecond,
            wind_direction_deg: self.wind_direction,
            condition_code: self.symbol.to_string(),
            thunder_probability: self.thunder,
        }
    }
}

#[async_trait::async_trait]
impl ForecastAdapter for NordicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Nordic
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
        let url = format!("{}/forecast", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.lat().to_string()),
                ("lon", coord.lon().to_string()),
                ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("endtime", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_hint(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), body, retry_after));
        }

        let parsed: NordicResponse = response.json().await?;
        Ok(parsed.series.into_iter().map(NordicPoint::into_raw).collect())
    }
}
