//! Durable (cross-run) cache tier.
//!
//! A disk-backed map of forecast blocks with per-entry expiry. The
//! whole map is held in memory behind a `RwLock` and rewritten to a
//! JSON file after mutations; a missing or corrupt file simply means
//! starting empty. Writes are compare-and-set on expiry recency so a
//! slow fetch finishing late can never clobber a fresher entry.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::CacheError;
use super::{CacheEntry, CacheKey};

/// Default entry count above which a write triggers a sweep.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Configuration for the durable cache tier.
#[derive(Debug, Clone)]
pub struct DurableCacheConfig {
    /// Path to the cache file.
    pub path: PathBuf,
    /// How long expired rows linger before the sweep removes them.
    pub grace: Duration,
    /// Minimum interval between time-triggered sweeps.
    pub sweep_interval: Duration,
    /// Entry count above which a write triggers a sweep.
    pub max_entries: usize,
}

impl DurableCacheConfig {
    /// Create a config with the given path and default freshness
    /// policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            grace: Duration::hours(6),
            sweep_interval: Duration::hours(1),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Set the post-expiry grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the size threshold for write-triggered sweeps.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

impl Default for DurableCacheConfig {
    fn default() -> Self {
        Self::new("weather_cache.json")
    }
}

/// On-disk representation of the cache.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    saved_at: DateTime<Utc>,
    entries: Vec<PersistedRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRow {
    key: CacheKey,
    entry: CacheEntry,
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    last_sweep: DateTime<Utc>,
}

/// Disk-backed forecast block cache.
#[derive(Debug)]
pub struct DurableCache {
    config: DurableCacheConfig,
    inner: RwLock<Inner>,
}

impl DurableCache {
    /// Open the cache, loading any existing file.
    ///
    /// A missing file means an empty cache; a corrupt file is logged
    /// and discarded rather than failing startup.
    pub async fn open(config: DurableCacheConfig) -> Result<Self, CacheError> {
        let entries = match std::fs::read_to_string(&config.path) {
            Ok(contents) => match serde_json::from_str::<PersistedCache>(&contents) {
                Ok(persisted) => persisted
                    .entries
                    .into_iter()
                    .map(|row| (row.key, row.entry))
                    .collect(),
                Err(e) => {
                    warn!(path = %config.path.display(), error = %e,
                        "discarding corrupt cache file");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        debug!(path = %config.path.display(), entries = entries.len(), "opened durable cache");

        Ok(Self {
            config,
            inner: RwLock::new(Inner {
                entries,
                last_sweep: Utc::now(),
            }),
        })
    }

    /// Read an entry if it exists and has not expired.
    pub async fn read(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CacheEntry> {
        let inner = self.inner.read().await;
        let entry = inner.entries.get(key)?;
        if now < entry.expires_at {
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Write an entry, replacing an existing row only when the new
    /// expiry is strictly more recent.
    ///
    /// Returns `true` when the entry was stored, `false` when an
    /// existing fresher row was kept. A write may trigger a sweep when
    /// the map has grown past the size threshold or the sweep interval
    /// has elapsed.
    pub async fn write(&self, key: CacheKey, entry: CacheEntry) -> Result<bool, CacheError> {
        if entry.expires_at < entry.fetched_at {
            return Err(CacheError::InvalidExpiry);
        }

        let now = Utc::now();
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.entries.get(&key)
            && existing.expires_at >= entry.expires_at
        {
            debug!(?key, "keeping fresher existing cache entry");
            return Ok(false);
        }

        inner.entries.insert(key, entry);

        if inner.entries.len() > self.config.max_entries
            || now - inner.last_sweep > self.config.sweep_interval
        {
            self.sweep_locked(&mut inner, now);
        }

        self.persist(&inner)?;
        Ok(true)
    }

    /// Remove rows past `expires_at + grace` and persist if anything
    /// was removed. Returns the number of removed rows.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let mut inner = self.inner.write().await;
        let removed = self.sweep_locked(&mut inner, now);
        if removed > 0 {
            self.persist(&inner)?;
        }
        Ok(removed)
    }

    fn sweep_locked(&self, inner: &mut Inner, now: DateTime<Utc>) -> usize {
        let grace = self.config.grace;
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.expires_at + grace >= now);
        inner.last_sweep = now;

        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!(removed, remaining = inner.entries.len(), "swept expired cache rows");
        }
        removed
    }

    /// Number of rows currently held (including expired-but-unswept
    /// ones).
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Drop every row and persist the empty cache.
    pub async fn invalidate_all(&self) -> Result<(), CacheError> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        self.persist(&inner)
    }

    fn persist(&self, inner: &Inner) -> Result<(), CacheError> {
        let persisted = PersistedCache {
            saved_at: Utc::now(),
            entries: inner
                .entries
                .iter()
                .map(|(key, entry)| PersistedRow {
                    key: *key,
                    entry: entry.clone(),
                })
                .collect(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                message: format!("failed to create cache directory: {e}"),
            })?;
        }

        let json = serde_json::to_string(&persisted).map_err(|e| CacheError::Serialize {
            message: e.to_string(),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| CacheError::Io {
            message: format!("failed to write cache file: {e}"),
        })
    }
}
