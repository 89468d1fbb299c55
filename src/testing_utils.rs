use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::data_fetcher::api::{FeedResource, FeedSource};
use crate::data_fetcher::document::Document;
use crate::error::AppError;

/// In-memory feed source that counts every fetch per resource.
///
/// Resources without a registered document answer with `ApiNotFound`.
#[derive(Debug, Default)]
pub struct StubFeedSource {
    documents: HashMap<FeedResource, Document>,
    failures: HashMap<FeedResource, u16>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<FeedResource, usize>>,
}

impl StubFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, resource: FeedResource, document: Document) -> Self {
        self.documents.insert(resource, document);
        self
    }

    /// Makes `resource` fail as if the API answered with `status`
    pub fn with_failure_status(mut self, resource: FeedResource, status: u16) -> Self {
        self.failures.insert(resource, status);
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Registers the event info, statistics and daily box score documents
    /// for one game in a single step.
    pub fn with_game(self, game: &GameFixture) -> Self {
        self.with_document(
            FeedResource::EventInfo(game.id.clone()),
            TestDataBuilder::event_info(&game.venue_id, &game.start_time),
        )
        .with_document(
            FeedResource::GameStatistics(game.id.clone()),
            TestDataBuilder::statistics(game.home_stats.clone(), game.visitor_stats.clone()),
        )
        .with_document(
            FeedResource::DailyBoxScore(game.date),
            TestDataBuilder::daily_box_score(vec![game.box_score_entry()]),
        )
    }

    pub fn calls(&self, resource: &FeedResource) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(resource).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }

    fn record_call(&self, resource: &FeedResource) {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(resource.clone()).or_insert(0) += 1;
        }
    }
}

impl FeedSource for StubFeedSource {
    async fn fetch(&self, resource: &FeedResource) -> Result<Document, AppError> {
        self.record_call(resource);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let url = resource.path();
        if let Some(status) = self.failures.get(resource) {
            return Err(match status {
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit("stubbed rate limit", url),
                400..=499 => AppError::api_client_error(*status, "stubbed failure", url),
                _ => AppError::api_server_error(*status, "stubbed failure", url),
            });
        }

        self.documents
            .get(resource)
            .cloned()
            .ok_or_else(|| AppError::api_not_found(url))
    }
}

/// Everything needed to serve one game from a [`StubFeedSource`].
#[derive(Debug, Clone)]
pub struct GameFixture {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub venue_id: String,
    pub status: String,
    pub innings: u32,
    pub home_box: Value,
    pub visitor_box: Value,
    pub home_stats: Value,
    pub visitor_stats: Value,
}

impl GameFixture {
    /// A closed nine inning game on 2013-10-11 with the given abbreviations
    /// and run totals.
    pub fn new(id: &str, home: (&str, u32), visitor: (&str, u32)) -> Self {
        Self {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2013, 10, 11).unwrap_or_default(),
            start_time: "2013-10-11T19:10:00-04:00".to_string(),
            venue_id: "venue-1".to_string(),
            status: "closed".to_string(),
            innings: 9,
            home_box: TestDataBuilder::box_score_side(home.0, home.1, 8),
            visitor_box: TestDataBuilder::box_score_side(visitor.0, visitor.1, 6),
            home_stats: json!({}),
            visitor_stats: json!({}),
        }
    }

    pub fn box_score_entry(&self) -> Value {
        TestDataBuilder::box_score_entry(
            &self.id,
            &self.status,
            self.innings,
            self.home_box.clone(),
            self.visitor_box.clone(),
        )
    }
}

/// Builders for feed documents shaped like the SportsData JSON feeds
pub struct TestDataBuilder;

impl TestDataBuilder {
    pub fn schedule(ids: &[&str]) -> Value {
        let events: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        json!({"calendars": {"event": events}})
    }

    /// One side of a box score entry: runs total first, then one empty
    /// record per inning
    pub fn box_score_side(abbr: &str, runs: u32, hits: u32) -> Value {
        json!({
            "abbr": abbr,
            "runs": [runs.to_string(), {"inning": "1"}],
            "hits": hits.to_string(),
        })
    }

    pub fn box_score_entry(
        id: &str,
        status: &str,
        innings: u32,
        home: Value,
        visitor: Value,
    ) -> Value {
        json!({
            "id": id,
            "status": status,
            "final": {"inning": innings.to_string()},
            "home": home,
            "visitor": visitor,
        })
    }

    pub fn daily_box_score(entries: Vec<Value>) -> Value {
        json!({"boxscores": {"boxscore": entries}})
    }

    pub fn statistics(home: Value, visitor: Value) -> Value {
        json!({"statistics": {"home": home, "visitor": visitor}})
    }

    pub fn event_info(venue_id: &str, scheduled_start_time: &str) -> Value {
        json!({"event": {
            "venue": {"id": venue_id},
            "scheduled_start_time": scheduled_start_time,
        }})
    }

    /// Venue directory from `(id, name, market)` triples
    pub fn venues(venues: &[(&str, &str, &str)]) -> Value {
        let list: Vec<Value> = venues
            .iter()
            .map(|(id, name, market)| json!({"id": id, "name": name, "market": market}))
            .collect();
        json!({"venues": {"venue": list}})
    }
}

/// Free-function form of [`TestDataBuilder::schedule`]
pub fn schedule_doc(ids: &[&str]) -> Value {
    TestDataBuilder::schedule(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_counts_calls_per_resource() {
        let stub = StubFeedSource::new().with_document(FeedResource::Venues, json!({"venues": {}}));

        assert!(stub.fetch(&FeedResource::Venues).await.is_ok());
        assert!(stub.fetch(&FeedResource::Venues).await.is_ok());
        let missing = stub
            .fetch(&FeedResource::GameStatistics("nope".to_string()))
            .await;

        assert!(matches!(missing, Err(AppError::ApiNotFound { .. })));
        assert_eq!(stub.calls(&FeedResource::Venues), 2);
        assert_eq!(stub.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_stub_failure_status() {
        let resource = FeedResource::Venues;
        let stub = StubFeedSource::new().with_failure_status(resource.clone(), 503);

        let err = stub.fetch(&resource).await.unwrap_err();
        assert!(err.is_upstream_failure());
    }

    #[tokio::test]
    async fn test_game_fixture_registers_all_fragments() {
        let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
        let stub = StubFeedSource::new().with_game(&fixture);

        let box_score = stub
            .fetch(&FeedResource::DailyBoxScore(fixture.date))
            .await
            .unwrap();
        assert_eq!(box_score["boxscores"]["boxscore"][0]["home"]["abbr"], "SEA");
        assert!(stub.fetch(&FeedResource::EventInfo("g1".to_string())).await.is_ok());
        assert!(
            stub.fetch(&FeedResource::GameStatistics("g1".to_string()))
                .await
                .is_ok()
        );
    }
}
