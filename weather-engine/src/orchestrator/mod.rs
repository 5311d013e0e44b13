//! Fetch orchestration.
//!
//! Coordinates the full read path: route the coordinate to a
//! provider, plan the window into native blocks, satisfy what the
//! cache can, batch the rest into rate-limited, retried fetches,
//! normalize and aggregate the results, and write them back through
//! the cache. Failed fetches leave gaps; the call itself only fails
//! for programmer errors.

mod config;
mod limiter;
mod plan;
mod retry;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::aggregate::aggregate;
use crate::cache::{CacheEntry, CacheKey, CacheStore, DurableCache};
use crate::domain::{Coordinate, DomainError, ForecastBlock, ForecastSample, ProviderId};
use crate::providers::{AdapterRegistry, ForecastAdapter, normalize};
use crate::router::select_provider;

pub use config::OrchestratorConfig;
pub use limiter::{CallLimiter, LimiterSaturated};
pub use plan::{PlannedBlock, batch_gaps, plan_blocks};
pub use retry::{FetchOutcome, RetryPolicy, with_retries};

/// The weather engine's public entry point.
///
/// Owns the only long-lived shared mutable state: the durable cache
/// and one rate limiter per registered provider. Requests for
/// distinct providers run concurrently; requests sharing a provider
/// queue on its limiter.
pub struct Orchestrator {
    registry: AdapterRegistry,
    cache: DurableCache,
    limiters: HashMap<ProviderId, CallLimiter>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator over a registry and an opened cache.
    ///
    /// Limiter state is built from each adapter's declared minimum
    /// call interval and lives for this value's lifetime.
    pub fn new(registry: AdapterRegistry, cache: DurableCache, config: OrchestratorConfig) -> Self {
        let limiters = registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let adapter = registry.get(id)?;
                Some((
                    id,
                    CallLimiter::new(
                        adapter.descriptor().min_call_interval,
                        config.max_limiter_wait,
                    ),
                ))
            })
            .collect();

        Self {
            registry,
            cache,
            limiters,
            config,
        }
    }

    /// Forecast blocks for `[start, end)` at a coordinate.
    ///
    /// Returns an ordered sequence, possibly with gaps where data
    /// could not be fetched. Errors only on invalid requests, never
    /// on data unavailability.
    pub async fn get_weather(
        &self,
        coord: Coordinate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ForecastBlock>, DomainError> {
        self.get_weather_until(coord, start, end, None).await
    }

    /// Convenience wrapper taking a duration instead of an end time.
    pub async fn get_weather_for(
        &self,
        coord: Coordinate,
        start: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Vec<ForecastBlock>, DomainError> {
        if duration <= Duration::zero() {
            return Err(DomainError::InvalidDuration);
        }
        self.get_weather_until(coord, start, start + duration, None).await
    }

    /// [`Self::get_weather`] with a caller deadline.
    ///
    /// When the deadline passes, in-flight fetching is abandoned and
    /// whatever is already cached is returned.
    pub async fn get_weather_until(
        &self,
        coord: Coordinate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> Result<Vec<ForecastBlock>, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidRange);
        }

        let provider = select_provider(coord);
        let adapter = self
            .registry
            .get(provider)
            .ok_or(DomainError::AdapterNotRegistered(provider))?;

        let now = Utc::now();
        let planned = plan_blocks(adapter.descriptor(), now, start, end);

        let mut store = CacheStore::new(&self.cache);
        let mut blocks = Vec::with_capacity(planned.len());
        let mut missing = Vec::new();

        for block in &planned {
            let key = CacheKey::new(provider, coord, block.start, self.config.bucket_decimals);
            match store.read(&key, now).await {
                // A key match alone is not enough: lead-time decay can
                // re-plan a span at a different resolution while the
                // old entry is still fresh. Accepting it would overlap
                // or under-cover the window, so it counts as a miss and
                // the expiry CAS resolves the overwrite.
                Some(cached) if cached.block_size == block.size => blocks.push(cached),
                Some(_) => {
                    debug!(%provider, start = %block.start, "cached block resolution mismatch");
                    missing.push(*block);
                }
                None => missing.push(*block),
            }
        }

        debug!(
            %provider,
            %coord,
            planned = planned.len(),
            cached = blocks.len(),
            missing = missing.len(),
            "resolved request window against cache"
        );

        for (range_start, range_end) in batch_gaps(&missing) {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                debug!(%provider, "deadline reached; returning cached blocks only");
                break;
            }

            let Some(samples) = self
                .fetch_range(adapter, provider, coord, range_start, range_end, deadline)
                .await
            else {
                continue; // gap stays unfilled
            };

            let fetched_at = Utc::now();
            let expires_at = fetched_at + adapter.descriptor().cache_ttl;

            for block in missing
                .iter()
                .filter(|b| b.start >= range_start && b.end() <= range_end)
            {
                let mut aggregated = aggregate(&samples, block.start, block.end(), block.size);
                let Some(aggregated) = aggregated.pop() else {
                    continue; // no samples for this span: omitted, not fabricated
                };

                let key = CacheKey::new(provider, coord, block.start, self.config.bucket_decimals);
                let entry = CacheEntry {
                    block: aggregated.clone(),
                    fetched_at,
                    expires_at,
                };
                if let Err(error) = store.write(key, entry).await {
                    // A cache write failure degrades freshness, not
                    // this response.
                    warn!(%error, %provider, "failed to write block through to cache");
                }

                blocks.push(aggregated);
            }
        }

        blocks.sort_by_key(|b| b.start);
        Ok(blocks)
    }

    /// Fetch and normalize one contiguous range, or `None` when the
    /// gap could not be filled.
    async fn fetch_range(
        &self,
        adapter: &Arc<dyn ForecastAdapter>,
        provider: ProviderId,
        coord: Coordinate,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        deadline: Option<Instant>,
    ) -> Option<Vec<ForecastSample>> {
        // Limiters are built from the registry, so every routable
        // provider has one.
        let Some(limiter) = self.limiters.get(&provider) else {
            warn!(%provider, "no limiter for provider; abandoning gap");
            return None;
        };

        let policy = RetryPolicy {
            max_attempts: self.config.max_attempts,
            initial_backoff: self.config.initial_backoff,
            max_backoff: self.config.max_backoff,
        };

        let attempt = async {
            if let Err(error) = limiter.acquire().await {
                warn!(%error, %provider, "abandoning gap: rate limiter saturated");
                return None;
            }

            match with_retries(&policy, || {
                adapter.fetch_raw(coord, range_start, range_end)
            })
            .await
            {
                FetchOutcome::Success(raw) => Some(raw),
                FetchOutcome::Failed(error) | FetchOutcome::Exhausted(error) => {
                    warn!(%error, %provider, %range_start, %range_end, "gap left unfilled");
                    None
                }
            }
        };

        let raw = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, attempt).await {
                Ok(raw) => raw,
                Err(_) => {
                    debug!(%provider, "deadline reached mid-fetch; abandoning gap");
                    None
                }
            },
            None => attempt.await,
        }?;

        Some(raw.iter().map(|r| normalize(r, provider)).collect())
    }

    /// The durable cache, for inspection and eviction calls.
    pub fn cache(&self) -> &DurableCache {
        &self.cache
    }
}
