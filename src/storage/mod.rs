//! League data storage
//!
//! This module defines the interfaces for reading and persisting schedule,
//! score and recap data, with a CSV file backend and an in-memory backend.

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvLeagueStore;
pub use memory::InMemoryLeagueStore;

use crate::error::Result;
use crate::types::{GameId, GameResult, Recap, ScheduleEntry};
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of completed game results for the standings aggregator.
///
/// Results come back in no particular order and are not deduplicated here.
/// A source with no results yet returns an empty list; failures to read the
/// underlying store surface as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultsProvider: Send + Sync {
    async fn list_results(&self) -> Result<Vec<GameResult>>;
}

/// Read/write access to everything the league publishes
#[async_trait]
pub trait LeagueStore: ResultsProvider {
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Schedule entries in upload order
    async fn schedule(&self) -> Result<Vec<ScheduleEntry>>;

    /// Replace the whole schedule, returning the number of entries stored
    async fn replace_schedule(&self, entries: Vec<ScheduleEntry>) -> Result<usize>;

    /// Merge results by game id, incoming records winning; returns the stored total
    async fn upsert_scores(&self, results: Vec<GameResult>) -> Result<usize>;

    async fn recaps(&self) -> Result<Vec<Recap>>;

    async fn recap(&self, game_id: &str) -> Result<Option<Recap>>;

    /// Insert or replace the recap for `recap.game_id`
    async fn upsert_recap(&self, recap: Recap) -> Result<()>;

    /// Remove a recap; `false` if none existed
    async fn delete_recap(&self, game_id: &str) -> Result<bool>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Merge score records keyed by game id.
///
/// Existing records keep their position, replaced in place when the upload
/// carries the same id; new ids are appended in upload order. Duplicate ids
/// collapse to the last record seen.
pub fn merge_scores(existing: Vec<GameResult>, incoming: Vec<GameResult>) -> Vec<GameResult> {
    let mut merged: Vec<GameResult> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<GameId, usize> = HashMap::new();

    for result in existing.into_iter().chain(incoming) {
        match index.get(&result.game_id) {
            Some(&position) => merged[position] = result,
            None => {
                index.insert(result.game_id.clone(), merged.len());
                merged.push(result);
            }
        }
    }

    merged
}

/// Insert or replace a recap keyed by game id, keeping list order
pub fn merge_recap(recaps: &mut Vec<Recap>, recap: Recap) {
    match recaps.iter_mut().find(|r| r.game_id == recap.game_id) {
        Some(slot) => *slot = recap,
        None => recaps.push(recap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(id: &str, score_a: i64, score_b: i64) -> GameResult {
        GameResult::new(
            id,
            NaiveDate::from_ymd_opt(2025, 10, 18).unwrap(),
            "SHARKS",
            "JAMMERS",
            score_a,
            score_b,
        )
    }

    #[test]
    fn test_merge_appends_new_ids() {
        let merged = merge_scores(vec![result("1", 10, 8)], vec![result("2", 5, 9)]);
        let ids: Vec<&str> = merged.iter().map(|r| r.game_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_merge_incoming_wins_in_place() {
        let merged = merge_scores(
            vec![result("1", 10, 8), result("2", 5, 9)],
            vec![result("1", 30, 31)],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].game_id, "1");
        assert_eq!((merged[0].score_a, merged[0].score_b), (30, 31));
    }

    #[test]
    fn test_merge_collapses_duplicates_within_upload() {
        let merged = merge_scores(Vec::new(), vec![result("3", 1, 2), result("3", 4, 5)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score_a, 4);
    }

    #[test]
    fn test_merge_recap_replaces_by_game_id() {
        let recap = |id: &str, score1: i64| Recap {
            game_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 10, 18).unwrap(),
            time: "6:10 PM".to_string(),
            team1: "SHARKS".to_string(),
            team2: "JAMMERS".to_string(),
            score1,
            score2: 40,
            location: String::new(),
            highlights: Vec::new(),
            player_of_the_match: String::new(),
            attendance: 0,
            weather: String::new(),
            recap: None,
        };

        let mut recaps = vec![recap("1", 41), recap("2", 50)];
        merge_recap(&mut recaps, recap("1", 44));
        merge_recap(&mut recaps, recap("3", 39));

        assert_eq!(recaps.len(), 3);
        assert_eq!(recaps[0].score1, 44);
        assert_eq!(recaps[2].game_id, "3");
    }

    #[tokio::test]
    async fn test_mock_provider_returns_configured_results() {
        let mut provider = MockResultsProvider::new();
        provider
            .expect_list_results()
            .times(1)
            .returning(|| Ok(vec![result("9", 1, 0)]));

        let results = provider.list_results().await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
