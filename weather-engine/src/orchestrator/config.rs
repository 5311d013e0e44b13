//! Orchestrator configuration.

use std::time::Duration;

use crate::cache::DEFAULT_BUCKET_DECIMALS;

/// Configuration parameters for the fetch orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum fetch attempts per gap, including the first.
    pub max_attempts: u32,

    /// Backoff before the second attempt; doubles per retry.
    pub initial_backoff: Duration,

    /// Ceiling for any single backoff or retry-after wait.
    pub max_backoff: Duration,

    /// Longest a fetch will queue behind the provider's rate limiter
    /// before the gap is abandoned instead.
    pub max_limiter_wait: Duration,

    /// Coordinate bucket precision for cache keys, in decimal
    /// degrees.
    pub bucket_decimals: u32,
}

impl OrchestratorConfig {
    /// Set the retry attempt budget. Clamped to at least one attempt.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the initial backoff.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the backoff/retry-after ceiling.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Set the bounded limiter wait.
    pub fn with_max_limiter_wait(mut self, max_wait: Duration) -> Self {
        self.max_limiter_wait = max_wait;
        self
    }

    /// Set the cache bucket precision.
    pub fn with_bucket_decimals(mut self, decimals: u32) -> Self {
        self.bucket_decimals = decimals;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            max_limiter_wait: Duration::from_secs(120),
            bucket_decimals: DEFAULT_BUCKET_DECIMALS,
        }
    }
}
