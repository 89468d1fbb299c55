//! A lazily resolved MLB game.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use super::SportsData;
use super::side::{ShortName, Side, SportTeam, same_team};
use super::summary::{GameSummary, SideSummary};
use crate::constants::SPORT_MLB;
use crate::data_fetcher::api::{FeedResource, FeedSource};
use crate::data_fetcher::cache::{CacheKey, CachePartition, FeedCache};
use crate::data_fetcher::document::{
    Document, DocumentExt, as_list, into_required, scalar_string, to_count,
};
use crate::error::AppError;

/// Which half of a game a fragment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideKind {
    Home,
    Visitor,
}

impl SideKind {
    /// Key of this side in box score and statistics documents
    pub fn as_str(&self) -> &'static str {
        match self {
            SideKind::Home => "home",
            SideKind::Visitor => "visitor",
        }
    }
}

/// Moves one side's half out of a fragment document, so the fragment and the
/// side built from it share one copy.
fn take_half(doc: &mut Document, kind: SideKind) -> Option<Arc<Document>> {
    doc.as_object_mut()
        .and_then(|object| object.remove(kind.as_str()))
        .filter(|half| !half.is_null())
        .map(Arc::new)
}

/// Statistics document split into its two sides
#[derive(Debug)]
struct StatisticsFragment {
    home: Arc<Document>,
    visitor: Arc<Document>,
}

impl StatisticsFragment {
    fn split(mut statistics: Document) -> Result<Self, AppError> {
        let mut half = |kind: SideKind| {
            take_half(&mut statistics, kind)
                .ok_or_else(|| AppError::missing_field(kind.as_str(), "statistics"))
        };
        let home = half(SideKind::Home)?;
        let visitor = half(SideKind::Visitor)?;
        Ok(Self { home, visitor })
    }

    fn half(&self, kind: SideKind) -> &Arc<Document> {
        match kind {
            SideKind::Home => &self.home,
            SideKind::Visitor => &self.visitor,
        }
    }
}

/// This game's entry from the daily box score batch
#[derive(Debug)]
struct BoxScoreFragment {
    entry: Document,
    home: Option<Arc<Document>>,
    visitor: Option<Arc<Document>>,
}

impl BoxScoreFragment {
    /// Picks this game's entry out of the batch. Duplicate ids should not
    /// happen; when they do the last listing wins. A game missing from the
    /// batch resolves to an empty entry and fails later on its required keys.
    fn select(batch: &Document, game_id: &str) -> Self {
        let matches: Vec<&Document> = as_list(batch.field("boxscore"))
            .into_iter()
            .filter(|entry| entry.field("id").and_then(scalar_string).as_deref() == Some(game_id))
            .collect();

        if matches.len() > 1 {
            warn!(
                "Daily box score lists game {} {} times, using the last entry",
                game_id,
                matches.len()
            );
        }

        let mut entry = matches
            .last()
            .map(|entry| (*entry).clone())
            .unwrap_or_else(|| Document::Object(Default::default()));
        let home = take_half(&mut entry, SideKind::Home);
        let visitor = take_half(&mut entry, SideKind::Visitor);
        Self {
            entry,
            home,
            visitor,
        }
    }

    fn half(&self, kind: SideKind) -> Result<Arc<Document>, AppError> {
        let half = match kind {
            SideKind::Home => &self.home,
            SideKind::Visitor => &self.visitor,
        };
        half.clone()
            .ok_or_else(|| AppError::missing_field(kind.as_str(), "box score"))
    }

    fn status(&self) -> Result<String, AppError> {
        self.entry.required_str("status", "box score")
    }

    fn innings(&self) -> u32 {
        to_count(self.entry.path(&["final", "inning"]))
    }
}

/// The `event` record of the event info feed
#[derive(Debug)]
struct EventInfoFragment {
    event: Document,
}

impl EventInfoFragment {
    fn venue_id(&self) -> Result<String, AppError> {
        self.event
            .field("venue")
            .unwrap_or(&Document::Null)
            .required_str("id", "event venue")
    }

    fn scheduled_start_time(&self) -> Result<DateTime<FixedOffset>, AppError> {
        let raw = self
            .event
            .required_str("scheduled_start_time", "event info")?;
        DateTime::parse_from_rfc3339(&raw).map_err(|e| {
            AppError::datetime_parse_error(format!("Invalid scheduled_start_time '{raw}': {e}"))
        })
    }
}

/// Handle for one game.
///
/// Constructing a handle fetches nothing. Each accessor resolves the
/// fragments it needs on first use:
///
/// - statistics, cached under `(stats, partition, game id)`
/// - event info, cached under `(event_info, partition, game id)`
/// - the daily box score batch, cached under `(daily_box_score, partition,
///   game date)`. The game date comes from the event info start time.
///
/// Every fragment and both sides are resolved at most once per handle, even
/// when accessors race. Any accessor can fail with `MissingField` or an
/// upstream error even though construction did not.
pub struct Game<F, C> {
    id: String,
    partition: CachePartition,
    sources: SportsData<F, C>,
    statistics: OnceCell<StatisticsFragment>,
    box_score: OnceCell<BoxScoreFragment>,
    event_info: OnceCell<EventInfoFragment>,
    home: OnceCell<Side>,
    visitor: OnceCell<Side>,
    location: OnceCell<String>,
}

impl<F, C> fmt::Debug for Game<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("partition", &self.partition)
            .field("statistics_resolved", &self.statistics.initialized())
            .field("box_score_resolved", &self.box_score.initialized())
            .field("event_info_resolved", &self.event_info.initialized())
            .finish()
    }
}

impl<F: FeedSource, C: FeedCache> Game<F, C> {
    pub(super) fn new(
        id: impl Into<String>,
        partition: CachePartition,
        sources: SportsData<F, C>,
    ) -> Self {
        Self {
            id: id.into(),
            partition,
            sources,
            statistics: OnceCell::new(),
            box_score: OnceCell::new(),
            event_info: OnceCell::new(),
            home: OnceCell::new(),
            visitor: OnceCell::new(),
            location: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cache_partition(&self) -> &CachePartition {
        &self.partition
    }

    pub fn sport(&self) -> &str {
        SPORT_MLB
    }

    pub async fn home(&self) -> Result<&Side, AppError> {
        self.home
            .get_or_try_init(|| self.build_side(SideKind::Home))
            .await
    }

    pub async fn visitor(&self) -> Result<&Side, AppError> {
        self.visitor
            .get_or_try_init(|| self.build_side(SideKind::Visitor))
            .await
    }

    pub async fn side(&self, kind: SideKind) -> Result<&Side, AppError> {
        match kind {
            SideKind::Home => self.home().await,
            SideKind::Visitor => self.visitor().await,
        }
    }

    /// Feed status string (e.g. `scheduled`, `inprogress`, `closed`)
    pub async fn status(&self) -> Result<String, AppError> {
        self.box_score().await?.status()
    }

    /// Side with strictly more runs.
    ///
    /// On a tie this returns the visitor, and so does [`Game::loser`]. That
    /// fallthrough is inherited behaviour and is kept until the tie policy
    /// is settled.
    pub async fn winner(&self) -> Result<&Side, AppError> {
        let (home, visitor) = self.sides().await?;
        Ok(match home.runs().cmp(&visitor.runs()) {
            Ordering::Greater => home,
            Ordering::Less => visitor,
            Ordering::Equal => visitor,
        })
    }

    /// Side with strictly fewer runs; the visitor on a tie (see [`Game::winner`]).
    pub async fn loser(&self) -> Result<&Side, AppError> {
        let (home, visitor) = self.sides().await?;
        Ok(match visitor.runs().cmp(&home.runs()) {
            Ordering::Greater => home,
            Ordering::Less => visitor,
            Ordering::Equal => visitor,
        })
    }

    /// Winner's runs minus loser's runs; 0 on a tie
    pub async fn run_differential(&self) -> Result<u32, AppError> {
        let winner = self.winner().await?;
        let loser = self.loser().await?;
        Ok(winner.runs().saturating_sub(loser.runs()))
    }

    /// Final inning count from the box score, 0 when not reported
    pub async fn innings(&self) -> Result<u32, AppError> {
        Ok(self.box_score().await?.innings())
    }

    /// Venue market, or the venue name when the market is blank. Empty when
    /// the venue directory does not know the venue.
    pub async fn location(&self) -> Result<&str, AppError> {
        self.location
            .get_or_try_init(|| async {
                let venue_id = self.event_info().await?.venue_id()?;
                let venue = self.sources.venue(&venue_id).await?;
                Ok::<_, AppError>(venue.display_location().to_string())
            })
            .await
            .map(String::as_str)
    }

    pub async fn start_time(&self) -> Result<DateTime<FixedOffset>, AppError> {
        self.event_info().await?.scheduled_start_time()
    }

    /// Calendar date of the game as the daily feeds see it
    pub async fn game_date(&self) -> Result<NaiveDate, AppError> {
        let start_time = self.start_time().await?;
        Ok(match self.sources.game_date_offset() {
            Some(offset) => start_time.with_timezone(&offset).date_naive(),
            None => start_time.date_naive(),
        })
    }

    /// True when `team` is an MLB team with the short name of either side.
    /// Teams from another sport are rejected without fetching anything.
    pub async fn team_playing<T>(&self, team: &T) -> Result<bool, AppError>
    where
        T: SportTeam + ?Sized,
    {
        if team.sport() != self.sport() {
            return Ok(false);
        }
        let (home, visitor) = self.sides().await?;
        Ok(same_team(home, team) || same_team(visitor, team))
    }

    /// Resolves statistics, event info and the box score concurrently.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub async fn prefetch(&self) -> Result<(), AppError> {
        tokio::try_join!(self.statistics(), self.box_score())?;
        Ok(())
    }

    /// Snapshot of every derived value, resolving whatever is still missing
    pub async fn summary(&self) -> Result<GameSummary, AppError> {
        let (home, visitor) = self.sides().await?;
        Ok(GameSummary {
            id: self.id.clone(),
            sport: self.sport().to_string(),
            status: self.status().await?,
            start_time: self.start_time().await?,
            location: self.location().await?.to_string(),
            innings: self.innings().await?,
            home: SideSummary::from(home),
            visitor: SideSummary::from(visitor),
            winner: self.winner().await?.short_name().to_string(),
            loser: self.loser().await?.short_name().to_string(),
            run_differential: self.run_differential().await?,
        })
    }

    async fn sides(&self) -> Result<(&Side, &Side), AppError> {
        tokio::try_join!(self.home(), self.visitor())
    }

    async fn build_side(&self, kind: SideKind) -> Result<Side, AppError> {
        let (box_score, statistics) = tokio::try_join!(self.box_score(), self.statistics())?;
        let side = Side::new(box_score.half(kind)?, Arc::clone(statistics.half(kind)))?;
        debug!(
            "Resolved {} side of game {}: {}",
            kind.as_str(),
            self.id,
            side.short_name()
        );
        Ok(side)
    }

    async fn statistics(&self) -> Result<&StatisticsFragment, AppError> {
        self.statistics
            .get_or_try_init(|| async {
                let key = CacheKey::stats(&self.partition, &self.id);
                let resource = FeedResource::GameStatistics(self.id.clone());
                let statistics = self
                    .sources
                    .cache()
                    .get_or_compute(key, || async {
                        let doc = self.sources.feed().fetch(&resource).await?;
                        into_required(doc, "statistics", "statistics document")
                    })
                    .await?;
                StatisticsFragment::split(statistics)
            })
            .await
    }

    async fn event_info(&self) -> Result<&EventInfoFragment, AppError> {
        self.event_info
            .get_or_try_init(|| async {
                let key = CacheKey::event_info(&self.partition, &self.id);
                let resource = FeedResource::EventInfo(self.id.clone());
                let event = self
                    .sources
                    .cache()
                    .get_or_compute(key, || async {
                        let doc = self.sources.feed().fetch(&resource).await?;
                        into_required(doc, "event", "event info document")
                    })
                    .await?;
                Ok::<_, AppError>(EventInfoFragment { event })
            })
            .await
    }

    async fn box_score(&self) -> Result<&BoxScoreFragment, AppError> {
        self.box_score
            .get_or_try_init(|| async {
                let game_date = self.game_date().await?;
                let key = CacheKey::daily_box_score(&self.partition, game_date);
                let resource = FeedResource::DailyBoxScore(game_date);
                let batch = self
                    .sources
                    .cache()
                    .get_or_compute(key, || async {
                        let doc = self.sources.feed().fetch(&resource).await?;
                        into_required(doc, "boxscores", "daily box score document")
                    })
                    .await?;
                Ok::<_, AppError>(BoxScoreFragment::select(&batch, &self.id))
            })
            .await
    }
}
