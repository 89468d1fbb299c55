use chrono::{FixedOffset, NaiveDate};
use mlb_sportsdata::{
    data_fetcher::api::{FeedResource, HttpFeedSource, create_http_client_with_timeout},
    data_fetcher::cache::{CacheKey, CachePartition, MemoryFeedCache},
    mlb::{ShortName, SportTeam, SportsData, TeamRef, same_team},
    testing_utils::{GameFixture, StubFeedSource, TestDataBuilder},
};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn sports_data(feed: StubFeedSource) -> SportsData<StubFeedSource, MemoryFeedCache> {
    SportsData::new(feed, MemoryFeedCache::with_settings(100, None))
}

fn partition() -> CachePartition {
    CachePartition::new("2013-10-11")
}

fn game_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2013, 10, 11).unwrap()
}

fn stats_resource(id: &str) -> FeedResource {
    FeedResource::GameStatistics(id.to_string())
}

fn event_resource(id: &str) -> FeedResource {
    FeedResource::EventInfo(id.to_string())
}

/// Repeated side access fetches each fragment once
#[tokio::test]
async fn test_home_is_memoized_per_game() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());

    let first = game.home().await.unwrap();
    let second = game.home().await.unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(first.short_name(), "SEA");

    let feed = sports_data.feed();
    assert_eq!(feed.calls(&FeedResource::DailyBoxScore(game_date())), 1);
    assert_eq!(feed.calls(&stats_resource("g1")), 1);
    assert_eq!(feed.calls(&event_resource("g1")), 1);

    game.visitor().await.unwrap();
    game.status().await.unwrap();
    game.innings().await.unwrap();
    assert_eq!(feed.total_calls(), 3);
}

#[tokio::test]
async fn test_constructing_a_game_fetches_nothing() {
    let sports_data = sports_data(StubFeedSource::new());
    let game = sports_data.game("g1", partition());

    assert_eq!(game.id(), "g1");
    assert_eq!(game.sport(), "MLB");
    assert_eq!(sports_data.feed().total_calls(), 0);
}

#[tokio::test]
async fn test_winner_has_strictly_more_runs() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());

    assert_eq!(game.winner().await.unwrap().short_name(), "SEA");
    assert_eq!(game.loser().await.unwrap().short_name(), "OAK");
    assert_eq!(game.run_differential().await.unwrap(), 3);
}

#[tokio::test]
async fn test_visitor_can_win() {
    let fixture = GameFixture::new("g1", ("SEA", 1), ("OAK", 4));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());

    assert_eq!(game.winner().await.unwrap().short_name(), "OAK");
    assert_eq!(game.loser().await.unwrap().short_name(), "SEA");
    assert_eq!(game.run_differential().await.unwrap(), 3);
}

#[tokio::test]
async fn test_tie_resolves_both_to_visitor() {
    let fixture = GameFixture::new("g1", ("SEA", 3), ("OAK", 3));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());

    let winner = game.winner().await.unwrap();
    let loser = game.loser().await.unwrap();
    let visitor = game.visitor().await.unwrap();

    assert!(std::ptr::eq(winner, visitor));
    assert!(std::ptr::eq(loser, visitor));
    assert_eq!(game.run_differential().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_box_score_entry_last_wins() {
    let fixture = GameFixture::new("g1", ("SEA", 1), ("OAK", 2));
    let later = GameFixture::new("g1", ("SEA", 9), ("OAK", 2));
    let other = GameFixture::new("g2", ("NYY", 4), ("BOS", 4));
    let feed = StubFeedSource::new().with_game(&fixture).with_document(
        FeedResource::DailyBoxScore(game_date()),
        TestDataBuilder::daily_box_score(vec![
            fixture.box_score_entry(),
            later.box_score_entry(),
            other.box_score_entry(),
        ]),
    );
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    assert_eq!(game.home().await.unwrap().runs(), 9);
}

#[tokio::test]
async fn test_game_absent_from_box_score_batch_is_missing_field() {
    let fixture = GameFixture::new("g1", ("SEA", 1), ("OAK", 2));
    let other = GameFixture::new("g2", ("NYY", 4), ("BOS", 4));
    let feed = StubFeedSource::new().with_game(&fixture).with_document(
        FeedResource::DailyBoxScore(game_date()),
        TestDataBuilder::daily_box_score(vec![other.box_score_entry()]),
    );
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    assert!(game.home().await.unwrap_err().is_missing_field());
    assert!(game.status().await.unwrap_err().is_missing_field());
}

#[tokio::test]
async fn test_game_level_metadata() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let feed = StubFeedSource::new().with_game(&fixture).with_document(
        FeedResource::Venues,
        TestDataBuilder::venues(&[("venue-1", "Safeco Field", "Seattle")]),
    );
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    assert_eq!(game.status().await.unwrap(), "closed");
    assert_eq!(game.innings().await.unwrap(), 9);
    assert_eq!(game.location().await.unwrap(), "Seattle");
    assert_eq!(
        game.start_time().await.unwrap().to_rfc3339(),
        "2013-10-11T19:10:00-04:00"
    );
    assert_eq!(game.game_date().await.unwrap(), game_date());
}

#[tokio::test]
async fn test_location_falls_back_to_venue_name_then_empty() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let mut elsewhere = GameFixture::new("g2", ("NYY", 1), ("BOS", 0));
    elsewhere.venue_id = "venue-9".to_string();
    let mut named = GameFixture::new("g3", ("LAD", 1), ("SF", 0));
    named.venue_id = "venue-2".to_string();

    let feed = StubFeedSource::new()
        .with_game(&fixture)
        .with_game(&elsewhere)
        .with_game(&named)
        .with_document(
            FeedResource::Venues,
            TestDataBuilder::venues(&[
                ("venue-1", "Safeco Field", "Seattle"),
                ("venue-2", "Tokyo Dome", ""),
            ]),
        );
    let sports_data = sports_data(feed);

    let unknown = sports_data.game("g2", partition());
    assert_eq!(unknown.location().await.unwrap(), "");

    let by_name = sports_data.game("g3", partition());
    assert_eq!(by_name.location().await.unwrap(), "Tokyo Dome");

    assert_eq!(sports_data.feed().calls(&FeedResource::Venues), 1);
}

#[tokio::test]
async fn test_missing_event_info_fields() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let feed = StubFeedSource::new()
        .with_game(&fixture)
        .with_document(event_resource("g1"), json!({"event": {"venue": {}}}));
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    assert!(game.start_time().await.unwrap_err().is_missing_field());
    assert!(game.location().await.unwrap_err().is_missing_field());
    assert!(game.home().await.unwrap_err().is_missing_field());
}

#[tokio::test]
async fn test_statistics_without_root_is_missing_field() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let feed = StubFeedSource::new()
        .with_game(&fixture)
        .with_document(stats_resource("g1"), json!({"game": {"id": "g1"}}));
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    let err = game.home().await.unwrap_err();
    assert!(err.is_missing_field());
    assert!(err.to_string().contains("statistics"));

    // The failure is not cached; the statistics feed is asked again
    assert!(game.visitor().await.is_err());
    assert_eq!(sports_data.feed().calls(&stats_resource("g1")), 2);
}

#[tokio::test]
async fn test_upstream_failure_surfaces_on_accessor() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let feed = StubFeedSource::new()
        .with_game(&fixture)
        .with_failure_status(stats_resource("g1"), 503);
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    assert!(game.home().await.unwrap_err().is_upstream_failure());
    // Fragments that do not need statistics still resolve
    assert_eq!(game.status().await.unwrap(), "closed");
}

struct HockeyTeam(&'static str);

impl ShortName for HockeyTeam {
    fn short_name(&self) -> &str {
        self.0
    }
}

impl SportTeam for HockeyTeam {
    fn sport(&self) -> &str {
        "NHL"
    }
}

#[tokio::test]
async fn test_team_playing() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());

    assert!(!game.team_playing(&HockeyTeam("SEA")).await.unwrap());
    assert_eq!(sports_data.feed().total_calls(), 0);

    assert!(game.team_playing(&TeamRef::mlb("SEA")).await.unwrap());
    assert!(game.team_playing(&TeamRef::mlb("OAK")).await.unwrap());
    assert!(!game.team_playing(&TeamRef::mlb("NYY")).await.unwrap());
}

#[tokio::test]
async fn test_sides_from_different_games_compare_by_short_name() {
    let first = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let mut second = GameFixture::new("g2", ("TEX", 0), ("SEA", 11));
    second.date = NaiveDate::from_ymd_opt(2013, 10, 12).unwrap();
    second.start_time = "2013-10-12T13:05:00-04:00".to_string();

    let sports_data = sports_data(StubFeedSource::new().with_game(&first).with_game(&second));
    let g1 = sports_data.game("g1", partition());
    let g2 = sports_data.game("g2", partition());

    let seattle_home = g1.home().await.unwrap();
    let seattle_away = g2.visitor().await.unwrap();

    assert_eq!(seattle_home, seattle_away);
    assert_ne!(seattle_home.runs(), seattle_away.runs());
    assert_ne!(g1.visitor().await.unwrap(), g2.home().await.unwrap());
    assert!(same_team(seattle_away, &TeamRef::mlb("SEA")));
}

#[tokio::test]
async fn test_side_statistics_flow_through() {
    let mut fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    fixture.home_box = json!({
        "abbr": "SEA",
        "runs": ["5", {"event": []}, {"event": [
            {"hitter_outcome": "aHR"},
            {"hitter_outcome": "kKL"}
        ]}],
        "hits": "10"
    });
    fixture.home_stats = json!({
        "pitching": {"team": {"games": {"save": "1", "shutout": "0"}}},
        "fielding": {"team": {"tp": "1"}},
        "hitting": {"players": {"player": [
            {"id": "p1", "onbase": {"s": "1", "d": "1", "t": "1"}},
            {"id": "p2", "onbase": {"s": "3", "d": "0", "t": "0"}}
        ]}}
    });
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));
    let game = sports_data.game("g1", partition());
    let home = game.home().await.unwrap();

    assert_eq!(home.hits(), 10);
    assert_eq!(home.homeruns(), 1);
    assert_eq!(home.strikeouts(), 1);
    assert_eq!(home.triple_plays(), 1);
    assert_eq!(home.cycles(), 1);
    assert!(home.is_save());
    assert!(!home.is_shutout());

    let visitor = game.visitor().await.unwrap();
    assert_eq!(visitor.cycles(), 0);
    assert!(!visitor.is_save());
}

#[tokio::test]
async fn test_concurrent_first_access_fetches_once() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let feed = StubFeedSource::new()
        .with_game(&fixture)
        .with_delay(Duration::from_millis(20));
    let sports_data = sports_data(feed);
    let game = sports_data.game("g1", partition());

    let (home, visitor, winner, status) =
        tokio::join!(game.home(), game.visitor(), game.winner(), game.status());
    assert_eq!(home.unwrap().short_name(), "SEA");
    assert_eq!(visitor.unwrap().short_name(), "OAK");
    assert_eq!(winner.unwrap().short_name(), "SEA");
    assert_eq!(status.unwrap(), "closed");

    assert_eq!(sports_data.feed().total_calls(), 3);
}

#[tokio::test]
async fn test_handles_share_the_cache_within_a_partition() {
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let sports_data = sports_data(StubFeedSource::new().with_game(&fixture));

    let first = sports_data.game("g1", partition());
    let second = sports_data.game("g1", partition());
    first.home().await.unwrap();
    second.home().await.unwrap();
    assert_eq!(sports_data.feed().total_calls(), 3);
    assert!(sports_data
        .cache()
        .contains(&CacheKey::stats(&partition(), "g1"))
        .await);

    let next_day = sports_data.game("g1", CachePartition::new("2013-10-12"));
    next_day.home().await.unwrap();
    assert_eq!(sports_data.feed().calls(&stats_resource("g1")), 2);
    assert_eq!(sports_data.feed().total_calls(), 6);
}

#[tokio::test]
async fn test_game_date_offset_picks_box_score_batch() {
    let mut fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    // 21:10 in Seattle is already the next day in UTC
    fixture.start_time = "2013-10-12T04:10:00+00:00".to_string();
    let pacific = FixedOffset::west_opt(7 * 3600).unwrap();

    let sports_data =
        sports_data(StubFeedSource::new().with_game(&fixture)).with_game_date_offset(pacific);
    let game = sports_data.game("g1", partition());

    assert_eq!(game.game_date().await.unwrap(), game_date());
    assert_eq!(game.home().await.unwrap().runs(), 5);
}

#[tokio::test]
async fn test_schedule_to_summaries() {
    let first = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));
    let second = GameFixture::new("g2", ("NYY", 3), ("BOS", 3));
    let feed = StubFeedSource::new()
        .with_document(
            FeedResource::DailySchedule(game_date()),
            TestDataBuilder::schedule(&["g1", "g2"]),
        )
        .with_document(
            FeedResource::DailySchedule(NaiveDate::from_ymd_opt(2013, 10, 12).unwrap()),
            json!({"calendars": {}}),
        )
        .with_game(&first)
        .with_document(
            FeedResource::EventInfo("g2".to_string()),
            TestDataBuilder::event_info("venue-1", &second.start_time),
        )
        .with_document(
            FeedResource::GameStatistics("g2".to_string()),
            TestDataBuilder::statistics(json!({}), json!({})),
        )
        .with_document(
            FeedResource::DailyBoxScore(game_date()),
            TestDataBuilder::daily_box_score(vec![
                first.box_score_entry(),
                second.box_score_entry(),
            ]),
        )
        .with_document(
            FeedResource::Venues,
            TestDataBuilder::venues(&[("venue-1", "Safeco Field", "Seattle")]),
        );
    let sports_data = sports_data(feed);

    let games = sports_data
        .games(
            &[game_date(), NaiveDate::from_ymd_opt(2013, 10, 12).unwrap()],
            &partition(),
        )
        .await
        .unwrap();
    assert_eq!(games.len(), 2);

    let mut summaries = Vec::new();
    for game in &games {
        game.prefetch().await.unwrap();
        summaries.push(game.summary().await.unwrap());
    }

    assert_eq!(
        summaries[0].scoreline(),
        "OAK 2 - 5 SEA  closed  9 inn  Seattle"
    );
    assert_eq!(summaries[1].winner, "BOS");
    assert_eq!(summaries[1].loser, "BOS");
    assert_eq!(summaries[1].run_differential, 0);

    // Both games share one daily box score batch
    assert_eq!(
        sports_data
            .feed()
            .calls(&FeedResource::DailyBoxScore(game_date())),
        1
    );
}

#[tokio::test]
async fn test_http_feed_source_end_to_end() {
    let server = MockServer::start().await;
    let fixture = GameFixture::new("g1", ("SEA", 5), ("OAK", 2));

    let routes = [
        ("/daily/schedule/2013/10/11.json", TestDataBuilder::schedule(&["g1"])),
        (
            "/event/g1.json",
            TestDataBuilder::event_info(&fixture.venue_id, &fixture.start_time),
        ),
        (
            "/statistics/g1.json",
            TestDataBuilder::statistics(json!({}), json!({})),
        ),
        (
            "/daily/boxscore/2013/10/11.json",
            TestDataBuilder::daily_box_score(vec![fixture.box_score_entry()]),
        ),
        (
            "/venues/venues.json",
            TestDataBuilder::venues(&[("venue-1", "Safeco Field", "Seattle")]),
        ),
    ];
    for (route, body) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = create_http_client_with_timeout(5).unwrap();
    let feed = HttpFeedSource::new(client, server.uri(), "test-key", 100);
    let sports_data = SportsData::new(feed, MemoryFeedCache::with_settings(100, None));

    let games = sports_data.games(&[game_date()], &partition()).await.unwrap();
    assert_eq!(games.len(), 1);

    let summary = games[0].summary().await.unwrap();
    assert_eq!(summary.scoreline(), "OAK 2 - 5 SEA  closed  9 inn  Seattle");
    assert_eq!(summary.sport, "MLB");
}
