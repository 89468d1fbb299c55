//! Cache keys and cached entry types with TTL support

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::data_fetcher::document::Document;

/// Caller-chosen namespace for cached per-game fragments.
///
/// Two runs on the same day with different partitions never see each
/// other's fragments. The partition does not change which game is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CachePartition(String);

impl CachePartition {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Partition named after today's local date
    pub fn today() -> Self {
        Self::from(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CachePartition {
    fn default() -> Self {
        Self::today()
    }
}

impl From<NaiveDate> for CachePartition {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl From<&str> for CachePartition {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for CachePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which fragment a cache entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Stats,
    DailyBoxScore,
    EventInfo,
    Venues,
}

impl CacheCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Stats => "stats",
            CacheCategory::DailyBoxScore => "daily_box_score",
            CacheCategory::EventInfo => "event_info",
            CacheCategory::Venues => "venues",
        }
    }

    /// Reference data is not scoped by partition and never expires
    pub fn is_reference_data(&self) -> bool {
        matches!(self, CacheCategory::Venues)
    }
}

/// Composite cache key: category, optional partition and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: CacheCategory,
    partition: Option<CachePartition>,
    identifier: Option<String>,
}

impl CacheKey {
    /// Statistics document of one game
    pub fn stats(partition: &CachePartition, game_id: &str) -> Self {
        Self {
            category: CacheCategory::Stats,
            partition: Some(partition.clone()),
            identifier: Some(game_id.to_string()),
        }
    }

    /// Daily box score batch. Scoped by the game's date, not its id.
    pub fn daily_box_score(partition: &CachePartition, game_date: NaiveDate) -> Self {
        Self {
            category: CacheCategory::DailyBoxScore,
            partition: Some(partition.clone()),
            identifier: Some(game_date.format("%Y-%m-%d").to_string()),
        }
    }

    /// Event info of one game
    pub fn event_info(partition: &CachePartition, game_id: &str) -> Self {
        Self {
            category: CacheCategory::EventInfo,
            partition: Some(partition.clone()),
            identifier: Some(game_id.to_string()),
        }
    }

    /// The venue directory
    pub fn venues() -> Self {
        Self {
            category: CacheCategory::Venues,
            partition: None,
            identifier: None,
        }
    }

    pub fn category(&self) -> CacheCategory {
        self.category
    }

    pub fn partition(&self) -> Option<&CachePartition> {
        self.partition.as_ref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_reference_data() {
            return f.write_str(self.category.as_str());
        }
        write!(f, "games/{}", self.category.as_str())?;
        if let Some(partition) = &self.partition {
            write!(f, "/{partition}")?;
        }
        if let Some(identifier) = &self.identifier {
            write!(f, "/{identifier}")?;
        }
        Ok(())
    }
}

/// Cached feed fragment
#[derive(Debug, Clone)]
pub struct CachedDocument {
    pub data: Document,
    pub cached_at: Instant,
}

impl CachedDocument {
    pub fn new(data: Document) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    /// Entries without a TTL never expire
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.cached_at.elapsed() > ttl)
    }
}

/// Cached HTTP response with TTL support
#[derive(Debug, Clone)]
pub struct CachedHttpResponse {
    pub data: String,
    pub cached_at: Instant,
    pub ttl_seconds: u64,
}

impl CachedHttpResponse {
    /// Creates a new cached HTTP response entry
    pub fn new(data: String, ttl_seconds: u64) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl_seconds,
        }
    }

    /// Checks if the cached data is expired
    pub fn is_expired(&self) -> bool {
        let ttl = Duration::from_secs(self.ttl_seconds);
        self.cached_at.elapsed() > ttl
    }
}

/// Snapshot of a cache's occupancy and hit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
