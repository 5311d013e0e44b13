//! Two-tier forecast block cache.
//!
//! The durable tier survives across runs: a disk-backed map keyed by
//! (provider, coordinate bucket, block start) with per-entry expiry
//! derived from the provider's freshness rules. The ephemeral tier is
//! a plain per-orchestration-run map that avoids repeated durable
//! lookups within one call graph.
//!
//! Coordinate bucketing (3 decimal degrees by default) bounds cache
//! cardinality while keeping nearby venues on the same rows.

mod durable;
mod error;
mod run;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, ForecastBlock, ProviderId};

pub use durable::{DurableCache, DurableCacheConfig};
pub use error::CacheError;
pub use run::RunCache;

/// Default coordinate bucket precision: 3 decimal degrees (~110 m).
pub const DEFAULT_BUCKET_DECIMALS: u32 = 3;

/// Composite key for one cached forecast block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub provider: ProviderId,
    pub lat_bucket: i64,
    pub lon_bucket: i64,
    pub block_start: DateTime<Utc>,
}

impl CacheKey {
    /// Build a key from a coordinate at the given bucket precision.
    pub fn new(
        provider: ProviderId,
        coord: Coordinate,
        block_start: DateTime<Utc>,
        bucket_decimals: u32,
    ) -> Self {
        let (lat_bucket, lon_bucket) = coord.bucket(bucket_decimals);
        Self {
            provider,
            lat_bucket,
            lon_bucket,
            block_start,
        }
    }
}

/// A cached forecast block with its freshness metadata.
///
/// Owned exclusively by the cache tiers; `expires_at >= fetched_at`
/// is enforced at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub block: ForecastBlock,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Read/write facade over the durable cache and one run's ephemeral
/// map.
///
/// Created per orchestration run; the ephemeral tier lives and dies
/// with this value, so it needs no cross-call synchronization.
pub struct CacheStore<'a> {
    durable: &'a DurableCache,
    run: RunCache,
}

impl<'a> CacheStore<'a> {
    /// Create a store for one orchestration run.
    pub fn new(durable: &'a DurableCache) -> Self {
        Self {
            durable,
            run: RunCache::new(),
        }
    }

    /// Read a block: ephemeral hit, else unexpired durable hit
    /// (promoted into the run map), else miss.
    pub async fn read(&mut self, key: &CacheKey, now: DateTime<Utc>) -> Option<ForecastBlock> {
        if let Some(block) = self.run.get(key) {
            return Some(block.clone());
        }

        let entry = self.durable.read(key, now).await?;
        self.run.put(*key, entry.block.clone());
        Some(entry.block)
    }

    /// Write a freshly fetched entry through both tiers.
    ///
    /// The durable tier applies its expiry compare-and-set; the run
    /// map always takes the new block since it is what this run just
    /// produced.
    pub async fn write(&mut self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.run.put(key, entry.block.clone());
        self.durable.write(key, entry).await?;
        Ok(())
    }

    /// Number of blocks the run map currently holds.
    pub fn run_entries(&self) -> usize {
        self.run.len()
    }
}
