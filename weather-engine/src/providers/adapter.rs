//! The adapter trait and provider registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{Coordinate, ProviderId};

use super::error::FetchError;
use super::raw::RawSample;

/// Static configuration describing one provider's behavior.
///
/// Carried by every adapter and consulted by the orchestrator for
/// rate limiting, horizon clamping, block planning, and cache expiry.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    /// Minimum interval between two calls to this provider.
    pub min_call_interval: std::time::Duration,
    /// How far ahead the provider can forecast.
    pub max_horizon: Duration,
    /// How long fetched blocks stay fresh in the cache.
    pub cache_ttl: Duration,
    /// Lead-time cutoff (hours) below which the fine resolution
    /// applies.
    pub fine_horizon_hours: i64,
    /// Block size within the fine horizon.
    pub fine_block: Duration,
    /// Block size beyond the fine horizon.
    pub coarse_block: Duration,
}

impl ProviderDescriptor {
    /// Native block size at a given lead time.
    ///
    /// Resolution is finer near-term and coarser far out.
    pub fn block_size_at(&self, hours_ahead: i64) -> Duration {
        if hours_ahead < self.fine_horizon_hours {
            self.fine_block
        } else {
            self.coarse_block
        }
    }
}

/// A regional forecast source.
///
/// Implementations perform the network call and return samples in
/// their native units and condition codes; cross-provider
/// normalization happens elsewhere.
#[async_trait]
pub trait ForecastAdapter: Send + Sync {
    /// The provider this adapter speaks for.
    fn id(&self) -> ProviderId;

    /// Static behavior of this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Fetch provider-native samples covering `[start, end)`.
    ///
    /// Any failure is an explicit [`FetchError`]; adapters never
    /// return a partial list disguised as success.
    async fn fetch_raw(
        &self,
        coord: Coordinate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>, FetchError>;
}

/// Lookup table from provider id to adapter instance.
///
/// Built once at startup and shared by the orchestrator; swapping an
/// adapter (e.g. for the mock) only touches registration.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ForecastAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own id, replacing any previous
    /// registration for that provider.
    pub fn register(mut self, adapter: Arc<dyn ForecastAdapter>) -> Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    /// Look up the adapter for a provider.
    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn ForecastAdapter>> {
        self.adapters.get(&id)
    }

    /// Ids of all registered providers.
    pub fn ids(&self) -> Vec<ProviderId> {
        self.adapters.keys().copied().collect()
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
