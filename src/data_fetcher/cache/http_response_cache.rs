use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::types::CachedHttpResponse;

/// LRU cache of raw HTTP bodies keyed by URL, each entry with its own TTL
#[derive(Debug)]
pub struct HttpResponseCache {
    entries: RwLock<LruCache<String, CachedHttpResponse>>,
}

impl HttpResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Caches HTTP response data with TTL
    #[instrument(skip(self, url, data), fields(url = %url))]
    pub async fn put(&self, url: String, data: String, ttl_seconds: u64) {
        debug!(
            "Caching HTTP response: url={}, data_size={}, ttl={}s",
            url,
            data.len(),
            ttl_seconds
        );

        let cached_data = CachedHttpResponse::new(data, ttl_seconds);
        self.entries.write().await.put(url, cached_data);
    }

    /// Retrieves cached HTTP response if it's not expired
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Option<String> {
        let mut cache = self.entries.write().await;

        if let Some(cached_entry) = cache.get(url) {
            if !cached_entry.is_expired() {
                debug!(
                    "Cache hit for HTTP response: url={}, data_size={}, age={:?}",
                    url,
                    cached_entry.data.len(),
                    cached_entry.cached_at.elapsed()
                );
                return Some(cached_entry.data.clone());
            }

            warn!(
                "Removing expired HTTP response cache entry: url={}, age={:?}, ttl={:?}",
                url,
                cached_entry.cached_at.elapsed(),
                Duration::from_secs(cached_entry.ttl_seconds)
            );
            cache.pop(url);
        } else {
            debug!("Cache miss for HTTP response: url={}", url);
        }

        None
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
