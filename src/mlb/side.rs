//! One team's half of a game: box score line plus team statistics.

use serde_json::Value;
use std::sync::{Arc, OnceLock};

use crate::constants::{SPORT_MLB, outcome_codes};
use crate::data_fetcher::document::{Document, DocumentExt, as_list, is_flag_set, to_count};
use crate::error::AppError;

/// Anything that can be identified by a team abbreviation.
pub trait ShortName {
    fn short_name(&self) -> &str;
}

/// A team reference that also names its sport.
pub trait SportTeam: ShortName {
    fn sport(&self) -> &str;
}

/// Teams are the same team when their short names match, whatever the
/// records were built from.
pub fn same_team<A, B>(a: &A, b: &B) -> bool
where
    A: ShortName + ?Sized,
    B: ShortName + ?Sized,
{
    a.short_name() == b.short_name()
}

/// Plain team reference for callers that only know an abbreviation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamRef {
    pub short_name: String,
    pub sport: String,
}

impl TeamRef {
    pub fn mlb(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            sport: SPORT_MLB.to_string(),
        }
    }
}

impl ShortName for TeamRef {
    fn short_name(&self) -> &str {
        &self.short_name
    }
}

impl SportTeam for TeamRef {
    fn sport(&self) -> &str {
        &self.sport
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PitchingFlags {
    save: bool,
    blown_save: bool,
    complete: bool,
    shutout: bool,
}

/// One side (home or visitor) of a resolved game.
///
/// Built once by its [`Game`](super::Game) from the side's box score fragment
/// and statistics fragment. Every derived number is computed on first use and
/// kept for the life of the side. Missing feed fields read as zero or false.
#[derive(Debug)]
pub struct Side {
    short_name: String,
    box_score: Arc<Document>,
    stats: Arc<Document>,
    runs: OnceLock<u32>,
    hits: OnceLock<u32>,
    homeruns: OnceLock<u32>,
    strikeouts: OnceLock<u32>,
    triple_plays: OnceLock<u32>,
    cycles: OnceLock<u32>,
    flags: OnceLock<PitchingFlags>,
}

impl Side {
    /// Fails with `MissingField` when the box score has no `abbr`.
    ///
    /// Both halves may be shared with the fragments they came from.
    pub fn new(
        box_score: impl Into<Arc<Document>>,
        stats: impl Into<Arc<Document>>,
    ) -> Result<Self, AppError> {
        let box_score = box_score.into();
        let short_name = box_score.required_str("abbr", "box score side")?;
        Ok(Self {
            short_name,
            box_score,
            stats: stats.into(),
            runs: OnceLock::new(),
            hits: OnceLock::new(),
            homeruns: OnceLock::new(),
            strikeouts: OnceLock::new(),
            triple_plays: OnceLock::new(),
            cycles: OnceLock::new(),
            flags: OnceLock::new(),
        })
    }

    /// Total runs: the first entry of the `runs` list.
    pub fn runs(&self) -> u32 {
        *self.runs.get_or_init(|| match self.box_score.field("runs") {
            Some(Value::Array(items)) => to_count(items.first()),
            Some(scalar @ (Value::String(_) | Value::Number(_))) => to_count(Some(scalar)),
            _ => 0,
        })
    }

    /// Alias for [`Side::runs`]
    pub fn score(&self) -> u32 {
        self.runs()
    }

    pub fn hits(&self) -> u32 {
        *self
            .hits
            .get_or_init(|| to_count(self.box_score.field("hits")))
    }

    /// Home runs in the last recorded inning.
    pub fn homeruns(&self) -> u32 {
        *self.homeruns.get_or_init(|| {
            self.count_outcomes(|code| code == outcome_codes::HOME_RUN)
        })
    }

    /// Strikeouts (looking or swinging) in the last recorded inning.
    pub fn strikeouts(&self) -> u32 {
        *self.strikeouts.get_or_init(|| {
            self.count_outcomes(|code| {
                code == outcome_codes::STRIKEOUT_LOOKING || code == outcome_codes::STRIKEOUT_SWINGING
            })
        })
    }

    pub fn is_save(&self) -> bool {
        self.flags().save
    }

    pub fn is_blown_save(&self) -> bool {
        self.flags().blown_save
    }

    /// A pitcher went the whole game
    pub fn is_complete(&self) -> bool {
        self.flags().complete
    }

    pub fn is_shutout(&self) -> bool {
        self.flags().shutout
    }

    pub fn triple_plays(&self) -> u32 {
        *self.triple_plays.get_or_init(|| {
            to_count(self.stats.path(&["fielding", "team", "tp"]))
        })
    }

    /// Players with at least one single, double and triple.
    pub fn cycles(&self) -> u32 {
        *self.cycles.get_or_init(|| {
            let players = as_list(self.stats.path(&["hitting", "players", "player"]));
            let count = players
                .into_iter()
                .filter(|player| {
                    let onbase = player.field("onbase");
                    ["s", "d", "t"]
                        .iter()
                        .all(|hit| to_count(onbase.and_then(|o| o.field(hit))) > 0)
                })
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }

    /// Raw box score fragment
    pub fn box_score(&self) -> &Document {
        &self.box_score
    }

    /// Raw statistics fragment
    pub fn stats(&self) -> &Document {
        &self.stats
    }

    fn flags(&self) -> PitchingFlags {
        *self.flags.get_or_init(|| {
            let games = self.stats.path(&["pitching", "team", "games"]);
            let flag = |name: &str| is_flag_set(games.and_then(|g| g.field(name)));
            PitchingFlags {
                save: flag("save"),
                blown_save: flag("blown_save"),
                complete: flag("complete"),
                shutout: flag("shutout"),
            }
        })
    }

    /// Play-by-play of the last recorded inning. A lone inning record (not a
    /// list) is treated as the only inning.
    fn last_inning_events(&self) -> Vec<&Value> {
        let inning = match self.box_score.field("runs") {
            Some(Value::Array(items)) => items.last(),
            Some(record @ Value::Object(_)) => Some(record),
            _ => None,
        };
        as_list(inning.and_then(|inning| inning.field("event")))
    }

    fn count_outcomes(&self, matches: impl Fn(&str) -> bool) -> u32 {
        let count = self
            .last_inning_events()
            .into_iter()
            .filter(|event| {
                event
                    .field("hitter_outcome")
                    .and_then(Value::as_str)
                    .is_some_and(&matches)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl ShortName for Side {
    fn short_name(&self) -> &str {
        &self.short_name
    }
}

impl SportTeam for Side {
    fn sport(&self) -> &str {
        SPORT_MLB
    }
}

impl PartialEq for Side {
    fn eq(&self, other: &Self) -> bool {
        same_team(self, other)
    }
}

impl Eq for Side {}

impl PartialEq<TeamRef> for Side {
    fn eq(&self, other: &TeamRef) -> bool {
        same_team(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn side(box_score: Value, stats: Value) -> Side {
        Side::new(box_score, stats).unwrap()
    }

    #[test]
    fn test_missing_abbr_is_missing_field() {
        let err = Side::new(json!({"runs": ["3"]}), json!({})).unwrap_err();
        assert!(err.is_missing_field());
    }

    #[test]
    fn test_runs_and_hits() {
        let home = side(
            json!({"abbr": "SEA", "runs": ["5", {"inning": "1"}], "hits": "9"}),
            json!({}),
        );
        assert_eq!(home.runs(), 5);
        assert_eq!(home.score(), 5);
        assert_eq!(home.hits(), 9);
    }

    #[test]
    fn test_absent_fields_read_as_zero() {
        let home = side(json!({"abbr": "SEA"}), json!({}));
        assert_eq!(home.runs(), 0);
        assert_eq!(home.hits(), 0);
        assert_eq!(home.homeruns(), 0);
        assert_eq!(home.strikeouts(), 0);
        assert_eq!(home.triple_plays(), 0);
        assert_eq!(home.cycles(), 0);
        assert!(!home.is_save());
        assert!(!home.is_shutout());
    }

    #[test]
    fn test_outcomes_only_count_last_inning() {
        let home = side(
            json!({
                "abbr": "NYY",
                "runs": [
                    "2",
                    {"event": [{"hitter_outcome": "aHR"}, {"hitter_outcome": "kKS"}]},
                    {"event": [{"hitter_outcome": "aS"}]}
                ]
            }),
            json!({}),
        );
        assert_eq!(home.homeruns(), 0);
        assert_eq!(home.strikeouts(), 0);
    }

    #[test]
    fn test_single_inning_record() {
        let home = side(
            json!({
                "abbr": "NYY",
                "runs": {"event": [
                    {"hitter_outcome": "aHR"},
                    {"hitter_outcome": "kKL"},
                    {"hitter_outcome": "kKS"},
                    {"hitter_outcome": "kKS"},
                    {"pitcher_outcome": "bB"}
                ]}
            }),
            json!({}),
        );
        assert_eq!(home.homeruns(), 1);
        assert_eq!(home.strikeouts(), 3);
        assert_eq!(home.runs(), 0);
    }

    #[test]
    fn test_lone_event_is_wrapped() {
        let home = side(
            json!({"abbr": "BOS", "runs": ["1", {"event": {"hitter_outcome": "aHR"}}]}),
            json!({}),
        );
        assert_eq!(home.homeruns(), 1);
    }

    #[test]
    fn test_pitching_flags() {
        let stats = json!({
            "pitching": {"team": {"games": {
                "save": "1", "blown_save": "0", "complete": "1", "shutout": "0"
            }}}
        });
        let home = side(json!({"abbr": "SEA"}), stats);
        assert!(home.is_save());
        assert!(!home.is_blown_save());
        assert!(home.is_complete());
        assert!(!home.is_shutout());
    }

    #[test]
    fn test_only_string_one_sets_a_flag() {
        let stats = json!({
            "pitching": {"team": {"games": {"save": 1, "complete": true, "shutout": "1"}}}
        });
        let home = side(json!({"abbr": "SEA"}), stats);
        assert!(!home.is_save());
        assert!(!home.is_complete());
        assert!(home.is_shutout());
    }

    #[test]
    fn test_triple_plays() {
        let home = side(
            json!({"abbr": "SEA"}),
            json!({"fielding": {"team": {"tp": "1"}}}),
        );
        assert_eq!(home.triple_plays(), 1);
    }

    #[test]
    fn test_cycles_need_single_double_and_triple() {
        let stats = json!({"hitting": {"players": {"player": [
            {"id": "a", "onbase": {"s": "1", "d": "1", "t": "1", "hr": "1"}},
            {"id": "b", "onbase": {"s": "2", "d": "1", "t": "0"}},
            {"id": "c", "onbase": {"s": "1", "d": "2", "t": "1"}},
            {"id": "d"}
        ]}}});
        let home = side(json!({"abbr": "SEA"}), stats);
        assert_eq!(home.cycles(), 2);
    }

    #[test]
    fn test_equality_by_short_name_only() {
        let a = side(json!({"abbr": "SEA", "runs": ["1"]}), json!({}));
        let b = side(
            json!({"abbr": "SEA", "runs": ["7"], "hits": "12"}),
            json!({"fielding": {"team": {"tp": "1"}}}),
        );
        let c = side(json!({"abbr": "OAK", "runs": ["1"]}), json!({}));

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, c);
        assert_eq!(a, TeamRef::mlb("SEA"));
        assert!(same_team(&TeamRef::mlb("OAK"), &c));
    }
}
