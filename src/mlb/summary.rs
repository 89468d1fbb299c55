use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::side::{ShortName, Side};

/// Per-side numbers captured by [`GameSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSummary {
    pub team: String,
    pub runs: u32,
    pub hits: u32,
    pub homeruns: u32,
    pub strikeouts: u32,
    pub triple_plays: u32,
    pub cycles: u32,
    pub save: bool,
    pub blown_save: bool,
    pub complete_game: bool,
    pub shutout: bool,
}

impl From<&Side> for SideSummary {
    fn from(side: &Side) -> Self {
        Self {
            team: side.short_name().to_string(),
            runs: side.runs(),
            hits: side.hits(),
            homeruns: side.homeruns(),
            strikeouts: side.strikeouts(),
            triple_plays: side.triple_plays(),
            cycles: side.cycles(),
            save: side.is_save(),
            blown_save: side.is_blown_save(),
            complete_game: side.is_complete(),
            shutout: side.is_shutout(),
        }
    }
}

/// Fully resolved snapshot of a game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub sport: String,
    pub status: String,
    pub start_time: DateTime<FixedOffset>,
    pub location: String,
    pub innings: u32,
    pub home: SideSummary,
    pub visitor: SideSummary,
    pub winner: String,
    pub loser: String,
    pub run_differential: u32,
}

impl GameSummary {
    /// Single line such as `OAK 2 - 5 SEA  closed  9 inn  Seattle`, visitor first
    pub fn scoreline(&self) -> String {
        let mut line = format!(
            "{} {} - {} {}  {}  {} inn",
            self.visitor.team, self.visitor.runs, self.home.runs, self.home.team, self.status,
            self.innings
        );
        if !self.location.is_empty() {
            line.push_str("  ");
            line.push_str(&self.location);
        }
        line
    }
}
