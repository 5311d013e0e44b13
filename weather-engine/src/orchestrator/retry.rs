//! Bounded retry with exponential backoff.
//!
//! Each gap fetch runs through one attempt sequence:
//! `Pending → Success`, `Pending → Pending` on a retryable failure
//! with attempts remaining, `Pending → Failed` on a permanent
//! failure, and `Pending → Exhausted` when the attempt budget runs
//! out. Rate-limit rejections honor the provider's retry-after hint
//! in place of the computed backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::providers::FetchError;

/// Retry behavior for one attempt sequence.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per retry.
    pub initial_backoff: Duration,
    /// Ceiling for any single wait.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Backoff after the given attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Terminal outcome of a retried fetch.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The fetch succeeded within the attempt budget.
    Success(T),
    /// A permanent error stopped the sequence; no retry.
    Failed(FetchError),
    /// The attempt budget ran out on retryable errors.
    Exhausted(FetchError),
}

impl<T> FetchOutcome<T> {
    /// The successful value, if any.
    pub fn into_success(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `op` with bounded retries for retryable failures.
///
/// Transient errors back off exponentially. Rate-limit errors wait
/// for the provider's retry-after hint when present; a hint beyond
/// the policy ceiling abandons the sequence rather than retrying
/// sooner than the provider demanded. Permanent errors abort
/// immediately. An empty attempt budget is treated as one attempt.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> FetchOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let error = match op().await {
            Ok(value) => return FetchOutcome::Success(value),
            Err(error) => error,
        };

        if !error.is_retryable() {
            warn!(%error, attempt, "permanent fetch error; not retrying");
            return FetchOutcome::Failed(error);
        }

        if attempt == max_attempts {
            warn!(%error, attempts = attempt, "retry budget exhausted");
            return FetchOutcome::Exhausted(error);
        }

        let wait = match &error {
            FetchError::RateLimited {
                retry_after: Some(hint),
            } => {
                if *hint > policy.max_backoff {
                    warn!(?hint, "retry-after hint exceeds the wait ceiling; giving up");
                    return FetchOutcome::Exhausted(error);
                }
                *hint
            }
            _ => policy.backoff(attempt),
        };

        warn!(%error, attempt, ?wait, "retryable fetch error; backing off");
        tokio::time::sleep(wait).await;
    }

    unreachable!("loop returns on every terminal state")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
        }
    }

    fn transient() -> FetchError {
        FetchError::Transient {
            message: "boom".into(),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.backoff(1), Duration::from_millis(500));
        assert_eq!(p.backoff(2), Duration::from_secs(1));
        assert_eq!(p.backoff(3), Duration::from_secs(2));
        assert_eq!(p.backoff(20), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let outcome = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(42)
            }
        })
        .await;

        assert_eq!(outcome.into_success(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn always_transient_makes_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let outcome: FetchOutcome<()> = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(matches!(outcome, FetchOutcome::Exhausted(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let outcome: FetchOutcome<()> = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Permanent {
                    message: "bad key".into(),
                })
            }
        })
        .await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_hint_is_honored() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let start = Instant::now();

        let outcome = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::RateLimited {
                        retry_after: Some(Duration::from_secs(30)),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(outcome.into_success(), Some(7));
        // Second attempt happened no sooner than the hint
        assert!(Instant::now() - start >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn hint_beyond_the_ceiling_abandons_without_waiting() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let start = Instant::now();

        // Hint of 120s against the 60s ceiling
        let outcome: FetchOutcome<()> = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::RateLimited {
                    retry_after: Some(Duration::from_secs(120)),
                })
            }
        })
        .await;

        assert!(matches!(outcome, FetchOutcome::Exhausted(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // No early retry was attempted
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempt_budget_still_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let zero = RetryPolicy {
            max_attempts: 0,
            ..policy()
        };

        let outcome: FetchOutcome<()> = with_retries(&zero, move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(matches!(outcome, FetchOutcome::Exhausted(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_without_hint_uses_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let start = Instant::now();

        let outcome = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::RateLimited { retry_after: None })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(matches!(outcome, FetchOutcome::Success(())));
        let elapsed = Instant::now() - start;
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let outcome = with_retries(&policy(), move || {
            let calls = calls2.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(outcome.into_success(), Some("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
