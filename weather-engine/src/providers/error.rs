//! Provider fetch error taxonomy.

use std::time::Duration;

/// Errors from a provider fetch.
///
/// The variant determines retry behavior in the orchestrator:
/// transient and rate-limit errors are retried with backoff,
/// permanent errors abort the attempt sequence immediately.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or 5xx response. Worth retrying.
    #[error("transient fetch error: {message}")]
    Transient { message: String },

    /// 429-class rejection, optionally carrying the provider's
    /// retry-after hint.
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    /// Other 4xx, authentication failure, or an unusable payload.
    /// Not retried.
    #[error("permanent fetch error: {message}")]
    Permanent { message: String },
}

impl FetchError {
    /// Whether the orchestrator may retry after this error.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::Permanent { .. })
    }

    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: u16, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            429 => FetchError::RateLimited { retry_after },
            500..=599 => FetchError::Transient {
                message: format!("provider returned {status}: {}", truncate(&body)),
            },
            _ => FetchError::Permanent {
                message: format!("provider returned {status}: {}", truncate(&body)),
            },
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Permanent {
                message: format!("unreadable payload: {err}"),
            }
        } else {
            // Timeouts, connect failures, and body transfer errors are
            // all worth another attempt.
            FetchError::Transient {
                message: err.to_string(),
            }
        }
    }
}

/// Parse a `Retry-After` header value (whole seconds form only).
pub(crate) fn retry_after_hint(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(body: &str) -> &str {
    let max = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..max]
}
