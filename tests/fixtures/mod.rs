//! Shared fixtures for integration testing

#![allow(dead_code)]

use chrono::NaiveDate;
use rec_league::metrics::MetricsCollector;
use rec_league::schedule::DEFAULT_VENUE;
use rec_league::storage::{CsvLeagueStore, LeagueStore};
use rec_league::types::{GameResult, Recap};
use rec_league::LeagueService;
use std::path::PathBuf;
use std::sync::Arc;

/// Regular season plus one playoff placeholder without a game id
pub const SCHEDULE_CSV: &str = "gameID,Date,Team 1,Team 2,Time\n\
1,10/4/25,BIG TIME,MANA HAWAII,6:10\n\
2,10/4/25,SHARKS,LOCKDOWN,7:10\n\
3,10/11/25,BIG TIME,SHARKS,6:10\n\
4,10/11/25,MANA HAWAII,LOCKDOWN,7:10\n\
5,10/18/25,BIG TIME,LOCKDOWN,6:10\n\
,11/1/25,SEED 1,SEED 4,6:10\n\
,11/1/25,No Game,No Game,7:10\n";

/// Scores for the first four games; the header uses lowercase aliases
pub const SCORES_CSV: &str = "game_id,date,team1,team2,score1,score2\n\
1,10/4/25,BIG TIME,MANA HAWAII,42,38\n\
2,10/4/25,SHARKS,LOCKDOWN,51,40\n\
3,10/11/25,BIG TIME,SHARKS,35,44\n\
4,10/11/25,MANA HAWAII,LOCKDOWN,30,30\n";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn result(game_id: &str, team_a: &str, team_b: &str, score_a: i64, score_b: i64) -> GameResult {
    GameResult::new(game_id, date(2025, 10, 4), team_a, team_b, score_a, score_b)
}

pub fn recap(game_id: &str) -> Recap {
    Recap {
        game_id: game_id.to_string(),
        date: date(2025, 10, 4),
        time: "6:10 PM".to_string(),
        team1: "BIG TIME".to_string(),
        team2: "MANA HAWAII".to_string(),
        score1: 42,
        score2: 38,
        location: DEFAULT_VENUE.to_string(),
        highlights: vec!["Late run in the fourth".to_string(), "12 threes".to_string()],
        player_of_the_match: "K. Nakamura".to_string(),
        attendance: 45,
        weather: String::new(),
        recap: Some("BIG TIME held on down the stretch.".to_string()),
    }
}

/// Fresh directory under the system temp dir, removed on drop
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("rec-league-it-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn csv_service(dir: &ScratchDir) -> (LeagueService, Arc<MetricsCollector>) {
    let store: Arc<dyn LeagueStore> = Arc::new(CsvLeagueStore::new(dir.path()));
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let service = LeagueService::new(store, metrics.clone(), DEFAULT_VENUE, true);
    (service, metrics)
}
