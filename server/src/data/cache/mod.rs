//! Cache module
//!
//! Short-lived in-memory caching backed by moka. Cached values are
//! best-effort: a miss always falls through to the real query.

mod key;

use std::time::Duration;

use moka::future::Cache;

pub use key::CacheKey;

use crate::core::constants::CACHE_MAX_MESSAGE_COUNTS;

/// Time-bounded cache for aggregate counts
///
/// Entries expire `ttl` after insertion regardless of reads, so a cached
/// count is never older than the freshness window.
#[derive(Clone)]
pub struct CountCache {
    cache: Cache<String, u64>,
    ttl: Duration,
}

impl std::fmt::Debug for CountCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl CountCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_MAX_MESSAGE_COUNTS)
            .time_to_live(ttl)
            .build();
        tracing::debug!(ttl_secs = ttl.as_secs(), "Count cache initialized");
        Self { cache, ttl }
    }

    pub async fn get(&self, key: &str) -> Option<u64> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: &str, value: u64) {
        self.cache.insert(key.to_string(), value).await;
    }
}
