//! Ephemeral per-run cache tier.

use std::collections::HashMap;

use crate::domain::ForecastBlock;

use super::CacheKey;

/// Short-lived block map scoped to one orchestration run.
///
/// Avoids redundant durable-tier lookups within a single call graph.
/// Owned by one [`super::CacheStore`], so no synchronization is
/// needed.
#[derive(Debug, Default)]
pub struct RunCache {
    blocks: HashMap<CacheKey, ForecastBlock>,
}

impl RunCache {
    /// Create an empty run cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a block.
    pub fn get(&self, key: &CacheKey) -> Option<&ForecastBlock> {
        self.blocks.get(key)
    }

    /// Insert or replace a block.
    pub fn put(&mut self, key: CacheKey, block: ForecastBlock) {
        self.blocks.insert(key, block);
    }

    /// Number of blocks held.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionCode, Coordinate, ForecastSample, ProviderId};
    use chrono::{DateTime, Duration, Utc};

    fn key_and_block() -> (CacheKey, ForecastBlock) {
        let start: DateTime<Utc> = "2026-06-01T12:00:00Z".parse().unwrap();
        let key = CacheKey::new(
            ProviderId::Global,
            Coordinate::new(40.71, -74.01).unwrap(),
            start,
            3,
        );
        let block = ForecastBlock {
            start,
            block_size: Duration::hours(1),
            sample: ForecastSample {
                timestamp: start,
                temperature_c: 20.0,
                precipitation_mm: 0.0,
                precipitation_probability: 0,
                wind_speed_mps: 1.0,
                wind_direction_deg: None,
                condition: ConditionCode::Clear,
                thunder_probability: 0,
            },
        };
        (key, block)
    }

    #[test]
    fn put_then_get() {
        let (key, block) = key_and_block();
        let mut cache = RunCache::new();

        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());

        cache.put(key, block.clone());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key), Some(&block));
    }

    #[test]
    fn put_replaces() {
        let (key, block) = key_and_block();
        let mut cache = RunCache::new();

        cache.put(key, block.clone());
        let mut newer = block;
        newer.sample.temperature_c = 25.0;
        cache.put(key, newer.clone());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key), Some(&newer));
    }
}
