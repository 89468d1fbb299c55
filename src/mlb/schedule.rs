//! Schedule queries: dates in, game handles out.

use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use super::{Game, SportsData};
use crate::data_fetcher::api::{FeedResource, FeedSource};
use crate::data_fetcher::cache::{CachePartition, FeedCache};
use crate::data_fetcher::document::{Document, DocumentExt, as_list};
use crate::error::AppError;

/// Reads the game ids listed in a daily schedule document, in listing order.
///
/// The `calendars` root is required and so is the `id` of every listed
/// event. A schedule without events lists nothing.
pub fn game_ids(schedule: &Document) -> Result<Vec<String>, AppError> {
    let calendars = schedule.required("calendars", "daily schedule")?;
    as_list(calendars.field("event"))
        .into_iter()
        .map(|event| event.required_str("id", "schedule event"))
        .collect()
}

impl<F: FeedSource, C: FeedCache> SportsData<F, C> {
    /// Game handles for every event scheduled on `dates`.
    ///
    /// Handles follow the order of `dates`, then the order the schedule lists
    /// them in. Nothing is deduplicated: a game listed twice yields two
    /// handles. Every handle shares `partition`. Schedule documents are
    /// fetched concurrently but are not cached.
    #[instrument(skip(self, dates, partition), fields(dates = dates.len(), partition = %partition))]
    pub async fn games(
        &self,
        dates: &[NaiveDate],
        partition: &CachePartition,
    ) -> Result<Vec<Game<F, C>>, AppError> {
        let per_date = try_join_all(dates.iter().map(|date| self.game_ids_for_date(*date))).await?;

        let games: Vec<Game<F, C>> = per_date
            .into_iter()
            .flatten()
            .map(|id| self.game(id, partition.clone()))
            .collect();

        info!("Schedule lists {} games across {} dates", games.len(), dates.len());
        Ok(games)
    }

    /// Ids listed in one date's schedule
    pub async fn game_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>, AppError> {
        let schedule = self
            .feed()
            .fetch(&FeedResource::DailySchedule(date))
            .await?;
        let ids = game_ids(&schedule)?;
        debug!("Schedule for {} lists {} games", date, ids.len());
        Ok(ids)
    }
}
