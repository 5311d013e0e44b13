//! Scripted mock adapter for testing without network access.
//!
//! Serves pre-loaded responses in order and records when each fetch
//! was attempted, so tests can assert retry counts and backoff
//! spacing. Once the script is exhausted every further call fails
//! transiently, which also makes an empty script a permanent outage.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Coordinate, ProviderId};

use super::adapter::{ForecastAdapter, ProviderDescriptor};
use super::error::FetchError;
use super::raw::{RawSample, TemperatureUnit, WindSpeedUnit};

/// Mock forecast adapter with a scripted response queue.
pub struct MockAdapter {
    id: ProviderId,
    descriptor: ProviderDescriptor,
    script: Mutex<VecDeque<Result<Vec<RawSample>, FetchError>>>,
    calls: Mutex<Vec<tokio::time::Instant>>,
}

impl MockAdapter {
    /// Create a mock with an empty script (every fetch fails
    /// transiently).
    pub fn new(id: ProviderId, descriptor: ProviderDescriptor) -> Self {
        Self {
            id,
            descriptor,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn with_response(self, samples: Vec<RawSample>) -> Self {
        self.script.lock().unwrap().push_back(Ok(samples));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: FetchError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of fetch attempts made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instants at which fetch attempts were made.
    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ForecastAdapter for MockAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_raw(
        &self,
        _coord: Coordinate,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>, FetchError> {
        self.calls.lock().unwrap().push(tokio::time::Instant::now());

        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Err(FetchError::Transient {
                message: "mock script exhausted".to_string(),
            }),
        }
    }
}

/// A descriptor suitable for most tests: hourly blocks within 48h,
/// six-hour blocks beyond, no rate limiting.
pub fn test_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        min_call_interval: std::time::Duration::ZERO,
        max_horizon: Duration::days(10),
        cache_ttl: Duration::hours(1),
        fine_horizon_hours: 48,
        fine_block: Duration::hours(1),
        coarse_block: Duration::hours(6),
    }
}

/// Build `count` hourly raw samples starting at `start`, all fair
/// weather with the given temperature.
pub fn hourly_samples(start: DateTime<Utc>, count: usize, temperature_c: f64) -> Vec<RawSample> {
    (0..count)
        .map(|i| RawSample {
            timestamp: start + Duration::hours(i as i64),
            temperature: temperature_c,
            temperature_unit: TemperatureUnit::Celsius,
            precipitation_mm: 0.0,
            precipitation_probability: Some(5.0),
            wind_speed: 3.0,
            wind_speed_unit: WindSpeedUnit::MetersPerSecond,
            wind_direction_deg: Some(180.0),
            condition_code: "2".to_string(),
            thunder_probability: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate::new(60.17, 24.94).unwrap()
    }

    #[tokio::test]
    async fn scripted_responses_in_order() {
        let start: DateTime<Utc> = "2026-06-01T12:00:00Z".parse().unwrap();
        let mock = MockAdapter::new(ProviderId::Nordic, test_descriptor())
            .with_response(hourly_samples(start, 2, 10.0))
            .with_failure(FetchError::Permanent {
                message: "gone".into(),
            });

        let end = start + Duration::hours(2);

        let first = mock.fetch_raw(coord(), start, end).await.unwrap();
        assert_eq!(first.len(), 2);

        let second = mock.fetch_raw(coord(), start, end).await;
        assert!(matches!(second, Err(FetchError::Permanent { .. })));

        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_fails_transiently() {
        let mock = MockAdapter::new(ProviderId::Global, test_descriptor());
        let start: DateTime<Utc> = "2026-06-01T12:00:00Z".parse().unwrap();

        let result = mock.fetch_raw(coord(), start, start + Duration::hours(1)).await;
        assert!(matches!(result, Err(FetchError::Transient { .. })));
    }
}
