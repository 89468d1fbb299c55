//! Shared get-or-compute cache for feed fragments

use lru::LruCache;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, instrument, warn};

use super::types::{CacheKey, CacheStats, CachedDocument};
use crate::data_fetcher::document::Document;
use crate::error::AppError;

/// Key/value store with get-or-compute semantics.
///
/// Implementations must tolerate concurrent calls for the same key. A failed
/// compute must not be cached.
pub trait FeedCache: Send + Sync {
    fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> impl Future<Output = Result<Document, AppError>> + Send
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Document, AppError>> + Send;
}

impl<T: FeedCache> FeedCache for Arc<T> {
    fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> impl Future<Output = Result<Document, AppError>> + Send
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Document, AppError>> + Send,
    {
        (**self).get_or_compute(key, compute)
    }
}

type Slot = Arc<OnceCell<CachedDocument>>;

#[derive(Debug)]
struct Entries {
    /// Completed fragments only
    cached: LruCache<CacheKey, CachedDocument>,
    /// Computes still running, one slot per key
    in_flight: HashMap<CacheKey, Slot>,
}

/// What a lookup found for a key
enum Lookup {
    Hit(Document),
    Compute(Slot),
}

/// In-process LRU implementation of [`FeedCache`].
///
/// Each key maps to a single-flight slot while it is being computed:
/// concurrent callers for the same key wait for the first compute instead of
/// starting their own. Only successful computes enter the LRU, so a failure
/// takes no capacity and evicts nothing. Partitioned fragments expire after
/// the optional TTL; the venue directory stays until evicted.
#[derive(Debug)]
pub struct MemoryFeedCache {
    entries: RwLock<Entries>,
    fragment_ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryFeedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                cached: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
            fragment_ttl: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Builds a cache from `cache_capacity` / `fragment_ttl_seconds` settings.
    /// A zero capacity is bumped to one.
    pub fn with_settings(capacity: usize, fragment_ttl_seconds: Option<u64>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity).with_fragment_ttl(fragment_ttl_seconds.map(Duration::from_secs))
    }

    pub fn with_fragment_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.fragment_ttl = ttl;
        self
    }

    fn ttl_for(&self, key: &CacheKey) -> Option<Duration> {
        if key.category().is_reference_data() {
            None
        } else {
            self.fragment_ttl
        }
    }

    async fn lookup(&self, key: &CacheKey) -> Lookup {
        let ttl = self.ttl_for(key);
        let mut entries = self.entries.write().await;

        if let Some(cached) = entries.cached.get(key) {
            if !cached.is_expired(ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Fragment cache hit: key={key}");
                return Lookup::Hit(cached.data.clone());
            }
            warn!(
                "Removing expired fragment cache entry: key={}, age={:?}",
                key,
                cached.cached_at.elapsed()
            );
            entries.cached.pop(key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Fragment cache miss: key={key}");
        let slot = entries
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()));
        Lookup::Compute(Arc::clone(slot))
    }

    /// Moves a finished compute out of the in-flight table. A successful
    /// result enters the LRU. A failed slot is dropped unless another caller
    /// is still waiting on it to retry.
    async fn settle(&self, key: &CacheKey, slot: &Slot) {
        let mut entries = self.entries.write().await;
        let Some(current) = entries.in_flight.get(key) else {
            return;
        };
        if !Arc::ptr_eq(current, slot) {
            return;
        }

        match slot.get() {
            Some(cached) => {
                entries.cached.put(key.clone(), cached.clone());
                entries.in_flight.remove(key);
            }
            // One reference in the table, one held by this caller
            None if Arc::strong_count(slot) <= 2 => {
                entries.in_flight.remove(key);
            }
            None => {}
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            size: entries.cached.len(),
            capacity: entries.cached.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.cached.contains(key)
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.cached.clear();
        entries.in_flight.clear();
    }
}

impl FeedCache for MemoryFeedCache {
    #[instrument(skip(self, compute), fields(cache_key = %key))]
    async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> Result<Document, AppError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Document, AppError>> + Send,
    {
        let slot = match self.lookup(&key).await {
            Lookup::Hit(data) => return Ok(data),
            Lookup::Compute(slot) => slot,
        };

        let result = slot
            .get_or_try_init(|| async move { compute().await.map(CachedDocument::new) })
            .await
            .map(|cached| cached.data.clone());
        self.settle(&key, &slot).await;
        result
    }
}
