//! MLB SportsData Aggregation Library
//!
//! This library combines the SportsData MLB feeds (daily schedule, daily box
//! score, per-game statistics, event info and the venue directory) into
//! lazily resolved [`Game`] and [`Side`] values, caching every fragment it
//! fetches.
//!
//! # Examples
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use mlb_sportsdata::config::Config;
//! use mlb_sportsdata::data_fetcher::cache::CachePartition;
//! use mlb_sportsdata::error::AppError;
//! use mlb_sportsdata::mlb::{HttpSportsData, ShortName};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let sports_data = HttpSportsData::from_config(&config)?;
//!
//!     let date = NaiveDate::from_ymd_opt(2013, 10, 11).unwrap();
//!     let games = sports_data
//!         .games(&[date], &CachePartition::from(date))
//!         .await?;
//!
//!     for game in &games {
//!         let winner = game.winner().await?;
//!         println!("{}: {} won by {}", game.id(), winner.short_name(), game.run_differential().await?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod logging;
pub mod mlb;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::api::{FeedResource, FeedSource, HttpFeedSource};
pub use data_fetcher::cache::{CacheKey, CachePartition, CacheStats, FeedCache, MemoryFeedCache};
pub use data_fetcher::document::{Document, DocumentExt};
pub use error::AppError;
pub use mlb::{
    Game, GameSummary, HttpSportsData, ShortName, Side, SideKind, SportTeam, SportsData, TeamRef,
    Venue,
};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
