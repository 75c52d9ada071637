//! Time-boxed response cache backed by moka

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use moka::future::Cache as MokaCache;

use crate::domain::{Clock, SystemClock};

/// Configuration for the response cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCacheConfig {
    /// Entries older than this are treated as absent
    pub ttl: Duration,
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
            max_capacity: 1_000,
        }
    }
}

impl ResponseCacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    written_at: DateTime<Utc>,
}

/// Memoizes values by an opaque string key.
///
/// Expiry is judged against the injected clock on read; moka's own
/// time-to-live and capacity bound only reclaim memory.
pub struct ResponseCache<V> {
    cache: MokaCache<String, CacheEntry<V>>,
    config: ResponseCacheConfig,
    clock: Arc<dyn Clock>,
}

impl<V> ResponseCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: ResponseCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ResponseCacheConfig, clock: Arc<dyn Clock>) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Ok(ttl) = config.ttl.to_std() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &ResponseCacheConfig {
        &self.config
    }

    /// Stored value, or `None` when absent or older than the TTL
    pub async fn get(&self, key: &str) -> Option<V> {
        let entry = self.cache.get(key).await?;

        if self.clock.now() - entry.written_at > self.config.ttl {
            self.cache.invalidate(key).await;
            return None;
        }

        Some(entry.value)
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            written_at: self.clock.now(),
        };

        self.cache.insert(key.into(), entry).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Entry count after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
