//! MLB games assembled from the SportsData schedule, box score, statistics,
//! event info and venue feeds.
//!
//! [`SportsData`] bundles a [`FeedSource`] and a [`FeedCache`]. It hands out
//! [`Game`] handles, either from a schedule query or directly from a known
//! game id. A handle fetches nothing until one of its accessors needs a
//! fragment; each fragment is then fetched through the shared cache at most
//! once per handle.

use chrono::FixedOffset;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::data_fetcher::api::{FeedSource, HttpFeedSource};
use crate::data_fetcher::cache::{CachePartition, FeedCache, MemoryFeedCache};
use crate::error::AppError;

pub mod game;
pub mod schedule;
pub mod side;
pub mod summary;
pub mod venue;

pub use game::{Game, SideKind};
pub use side::{ShortName, Side, SportTeam, TeamRef, same_team};
pub use summary::{GameSummary, SideSummary};
pub use venue::Venue;

/// SportsData client wired to the real HTTP API and an in-process cache
pub type HttpSportsData = SportsData<HttpFeedSource, MemoryFeedCache>;

/// Entry point: a feed source plus the cache shared by every game it creates.
pub struct SportsData<F, C> {
    feed: Arc<F>,
    cache: Arc<C>,
    game_date_offset: Option<FixedOffset>,
}

impl<F, C> Clone for SportsData<F, C> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
            cache: Arc::clone(&self.cache),
            game_date_offset: self.game_date_offset,
        }
    }
}

impl<F, C> fmt::Debug for SportsData<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SportsData")
            .field("game_date_offset", &self.game_date_offset)
            .finish_non_exhaustive()
    }
}

impl<F: FeedSource, C: FeedCache> SportsData<F, C> {
    pub fn new(feed: F, cache: C) -> Self {
        Self::from_shared(Arc::new(feed), Arc::new(cache))
    }

    pub fn from_shared(feed: Arc<F>, cache: Arc<C>) -> Self {
        Self {
            feed,
            cache,
            game_date_offset: None,
        }
    }

    /// Offset used to turn a game's start time into the date of the daily
    /// box score batch that lists it. Without one, the offset printed in the
    /// feed's own timestamp is used.
    pub fn with_game_date_offset(mut self, offset: FixedOffset) -> Self {
        self.game_date_offset = Some(offset);
        self
    }

    pub fn game_date_offset(&self) -> Option<FixedOffset> {
        self.game_date_offset
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Handle for a game whose id is already known. Nothing is fetched yet.
    pub fn game(&self, id: impl Into<String>, partition: CachePartition) -> Game<F, C> {
        Game::new(id, partition, self.clone())
    }
}

impl HttpSportsData {
    /// Builds the HTTP feed source and memory cache from configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let feed = HttpFeedSource::from_config(config)?;
        let cache =
            MemoryFeedCache::with_settings(config.cache_capacity, config.fragment_ttl_seconds);
        let mut sports_data = Self::new(feed, cache);

        if let Some(hours) = config.game_date_utc_offset_hours {
            let offset = FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
                AppError::config_error(format!("Invalid UTC offset: {hours} hours"))
            })?;
            sports_data = sports_data.with_game_date_offset(offset);
        }

        Ok(sports_data)
    }
}
