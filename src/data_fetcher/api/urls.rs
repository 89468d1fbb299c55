//! Feed resources and URL building for the SportsData MLB endpoints

use chrono::NaiveDate;
use std::fmt;

/// One addressable feed of the SportsData MLB API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedResource {
    /// Games scheduled on a date
    DailySchedule(NaiveDate),
    /// Box scores for every game on a date
    DailyBoxScore(NaiveDate),
    /// Detailed statistics for one game
    GameStatistics(String),
    /// Venue and start time for one game
    EventInfo(String),
    /// Directory of every venue
    Venues,
}

impl FeedResource {
    /// Path of the resource relative to the API domain.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use mlb_sportsdata::data_fetcher::api::FeedResource;
    ///
    /// let date = NaiveDate::from_ymd_opt(2013, 10, 11).unwrap();
    /// assert_eq!(
    ///     FeedResource::DailySchedule(date).path(),
    ///     "daily/schedule/2013/10/11.json"
    /// );
    /// ```
    pub fn path(&self) -> String {
        match self {
            FeedResource::DailySchedule(date) => {
                format!("daily/schedule/{}.json", date_to_yyyy_mm_dd(*date))
            }
            FeedResource::DailyBoxScore(date) => {
                format!("daily/boxscore/{}.json", date_to_yyyy_mm_dd(*date))
            }
            FeedResource::GameStatistics(event_id) => format!("statistics/{event_id}.json"),
            FeedResource::EventInfo(event_id) => format!("event/{event_id}.json"),
            FeedResource::Venues => "venues/venues.json".to_string(),
        }
    }

    /// Short name of the feed for logs
    pub fn label(&self) -> &'static str {
        match self {
            FeedResource::DailySchedule(_) => "daily_schedule",
            FeedResource::DailyBoxScore(_) => "daily_box_score",
            FeedResource::GameStatistics(_) => "game_statistics",
            FeedResource::EventInfo(_) => "event_info",
            FeedResource::Venues => "venues",
        }
    }

    /// Daily batches change during game days and are refreshed more often
    pub fn is_daily_batch(&self) -> bool {
        matches!(
            self,
            FeedResource::DailySchedule(_)
                | FeedResource::DailyBoxScore(_)
        )
    }
}

impl fmt::Display for FeedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Builds the full URL for a feed resource. The API key is added as a query
/// parameter by the HTTP layer and never appears here.
///
/// # Example
/// ```
/// use mlb_sportsdata::data_fetcher::api::{FeedResource, build_feed_url};
///
/// let url = build_feed_url("http://api.example.com/mlb-t4/", &FeedResource::Venues);
/// assert_eq!(url, "http://api.example.com/mlb-t4/venues/venues.json");
/// ```
pub fn build_feed_url(api_domain: &str, resource: &FeedResource) -> String {
    format!("{}/{}", api_domain.trim_end_matches('/'), resource.path())
}

/// Converts a date into the `YYYY/MM/DD` path segment used by the daily feeds.
pub fn date_to_yyyy_mm_dd(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}
