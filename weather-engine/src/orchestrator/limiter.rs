//! Per-provider call rate limiting.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Error returned when honoring the call interval would exceed the
/// bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rate limiter saturated: next slot is {would_wait:?} away")]
pub struct LimiterSaturated {
    pub would_wait: Duration,
}

/// Enforces a minimum interval between calls to one provider.
///
/// Callers queue on the internal mutex, so concurrent requests for
/// the same provider are serialized and each claims its own slot.
/// Waits are bounded: if honoring the interval would exceed
/// `max_wait`, [`CallLimiter::acquire`] returns an error instead of
/// blocking indefinitely.
#[derive(Debug)]
pub struct CallLimiter {
    min_interval: Duration,
    max_wait: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CallLimiter {
    /// Create a limiter with the given minimum interval and wait
    /// bound.
    pub fn new(min_interval: Duration, max_wait: Duration) -> Self {
        Self {
            min_interval,
            max_wait,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until a call slot is available, then claim it.
    ///
    /// Holding the internal lock across the sleep is what serializes
    /// same-provider callers; each waiter observes the slot claimed
    /// by the previous one.
    pub async fn acquire(&self) -> Result<(), LimiterSaturated> {
        let mut last = self.last_call.lock().await;

        let now = Instant::now();
        let ready_at = match *last {
            Some(prev) => prev + self.min_interval,
            None => now,
        };

        if ready_at > now {
            let wait = ready_at - now;
            if wait > self.max_wait {
                return Err(LimiterSaturated { would_wait: wait });
            }
            tokio::time::sleep_until(ready_at).await;
        }

        *last = Some(Instant::now());
        Ok(())
    }
}
