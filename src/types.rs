//! Common types used throughout the league service

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Opaque game identifier exactly as it appears in uploaded data
pub type GameId = String;

/// Team name; equality is exact and case-sensitive
pub type TeamName = String;

/// One completed game's two teams and their final scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameId,
    pub date: NaiveDate,
    pub team_a: TeamName,
    pub team_b: TeamName,
    pub score_a: i64,
    pub score_b: i64,
}

impl GameResult {
    pub fn new(
        game_id: impl Into<GameId>,
        date: NaiveDate,
        team_a: impl Into<TeamName>,
        team_b: impl Into<TeamName>,
        score_a: i64,
        score_b: i64,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            date,
            team_a: team_a.into(),
            team_b: team_b.into(),
            score_a,
            score_b,
        }
    }

    /// The same game recorded from the other team's side
    pub fn swapped(&self) -> Self {
        Self {
            game_id: self.game_id.clone(),
            date: self.date,
            team_a: self.team_b.clone(),
            team_b: self.team_a.clone(),
            score_a: self.score_b,
            score_b: self.score_a,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.score_a == self.score_b
    }

    pub fn total_points(&self) -> i64 {
        self.score_a.saturating_add(self.score_b)
    }
}

/// A team's aggregated win/loss/points record and its rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    /// 1-based position in the ordered table
    pub rank: usize,
    pub team: TeamName,
    pub wins: u32,
    pub losses: u32,
    /// Wins plus losses; tied games are not counted
    pub games_played: u32,
    pub points_for: i64,
    pub points_against: i64,
    pub point_differential: i64,
    pub avg_point_differential: f64,
}

/// A row of the uploaded schedule, before presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Playoff placeholder games are scheduled before they have an id
    pub game_id: Option<GameId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub team1: TeamName,
    pub team2: TeamName,
    pub is_playoff: bool,
}

/// Where a scheduled game stands relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Today,
    Completed,
    Playoff,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Scheduled => write!(f, "scheduled"),
            GameStatus::Today => write!(f, "today"),
            GameStatus::Completed => write!(f, "completed"),
            GameStatus::Playoff => write!(f, "playoff"),
        }
    }
}

/// Final score oriented to a scheduled game's team1/team2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub score1: i64,
    pub score2: i64,
}

/// Schedule row as served to the public pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub id: usize,
    pub game_id: Option<GameId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub team1: TeamName,
    pub team2: TeamName,
    pub location: String,
    pub status: GameStatus,
    pub is_playoff: bool,
    pub score: Option<GameScore>,
}

/// Written summary of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recap {
    pub game_id: GameId,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    pub team1: TeamName,
    pub team2: TeamName,
    pub score1: i64,
    pub score2: i64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub player_of_the_match: String,
    #[serde(default)]
    pub attendance: u32,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub recap: Option<String>,
}

/// League-wide scoring totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresStats {
    pub total_games: usize,
    pub total_points: i64,
    /// Rounded to one decimal place
    pub average_points_per_game: f64,
}

/// Kind of CSV an admin uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Schedule,
    Scores,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Schedule => "schedule",
            UploadKind::Scores => "scores",
        }
    }
}

impl std::fmt::Display for UploadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an accepted upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub kind: UploadKind,
    /// Records taken from this upload
    pub accepted: usize,
    /// Rows dropped because they failed validation
    pub rejected: usize,
    /// Records held by the store after the upload
    pub stored_total: usize,
    pub errors: Vec<String>,
    pub message: String,
}
