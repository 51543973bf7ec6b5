//! In-memory league store
//!
//! Holds everything in `RwLock`-guarded vectors. Used for tests, demos and
//! `--storage memory` runs where nothing needs to survive a restart.

use super::{merge_recap, merge_scores, LeagueStore, ResultsProvider};
use crate::error::{LeagueError, Result};
use crate::types::{GameResult, Recap, ScheduleEntry};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct InMemoryLeagueStore {
    schedule: RwLock<Vec<ScheduleEntry>>,
    scores: RwLock<Vec<GameResult>>,
    recaps: RwLock<Vec<Recap>>,
}

impl InMemoryLeagueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with schedule and scores
    pub fn with_data(schedule: Vec<ScheduleEntry>, scores: Vec<GameResult>) -> Self {
        Self {
            schedule: RwLock::new(schedule),
            scores: RwLock::new(merge_scores(Vec::new(), scores)),
            recaps: RwLock::new(Vec::new()),
        }
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| {
        LeagueError::InternalError {
            message: format!("Failed to acquire {} read lock", name),
        }
        .into()
    })
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| {
        LeagueError::InternalError {
            message: format!("Failed to acquire {} write lock", name),
        }
        .into()
    })
}

#[async_trait]
impl ResultsProvider for InMemoryLeagueStore {
    async fn list_results(&self) -> Result<Vec<GameResult>> {
        Ok(read(&self.scores, "scores")?.clone())
    }
}

#[async_trait]
impl LeagueStore for InMemoryLeagueStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn schedule(&self) -> Result<Vec<ScheduleEntry>> {
        Ok(read(&self.schedule, "schedule")?.clone())
    }

    async fn replace_schedule(&self, entries: Vec<ScheduleEntry>) -> Result<usize> {
        let mut schedule = write(&self.schedule, "schedule")?;
        *schedule = entries;
        Ok(schedule.len())
    }

    async fn upsert_scores(&self, results: Vec<GameResult>) -> Result<usize> {
        let mut scores = write(&self.scores, "scores")?;
        let merged = merge_scores(std::mem::take(&mut *scores), results);
        *scores = merged;
        Ok(scores.len())
    }

    async fn recaps(&self) -> Result<Vec<Recap>> {
        Ok(read(&self.recaps, "recaps")?.clone())
    }

    async fn recap(&self, game_id: &str) -> Result<Option<Recap>> {
        let recaps = read(&self.recaps, "recaps")?;
        Ok(recaps.iter().find(|r| r.game_id == game_id).cloned())
    }

    async fn upsert_recap(&self, recap: Recap) -> Result<()> {
        let mut recaps = write(&self.recaps, "recaps")?;
        merge_recap(&mut recaps, recap);
        Ok(())
    }

    async fn delete_recap(&self, game_id: &str) -> Result<bool> {
        let mut recaps = write(&self.recaps, "recaps")?;
        let before = recaps.len();
        recaps.retain(|r| r.game_id != game_id);
        Ok(recaps.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        read(&self.scores, "scores").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn entry(id: &str) -> ScheduleEntry {
        ScheduleEntry {
            game_id: Some(id.to_string()),
            date: date(),
            time: NaiveTime::from_hms_opt(18, 10, 0).unwrap(),
            team1: "LOCKDOWN".to_string(),
            team2: "RAINJAHZ".to_string(),
            is_playoff: false,
        }
    }

    fn recap(id: &str) -> Recap {
        Recap {
            game_id: id.to_string(),
            date: date(),
            time: "6:10 PM".to_string(),
            team1: "LOCKDOWN".to_string(),
            team2: "RAINJAHZ".to_string(),
            score1: 40,
            score2: 36,
            location: "Manoa Basketball Gym".to_string(),
            highlights: vec!["Buzzer beater".to_string()],
            player_of_the_match: "K. Kahale".to_string(),
            attendance: 45,
            weather: "Clear".to_string(),
            recap: None,
        }
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = InMemoryLeagueStore::new();
        tokio_test::block_on(async {
            assert!(store.list_results().await.unwrap().is_empty());
            assert!(store.schedule().await.unwrap().is_empty());
            assert!(store.recaps().await.unwrap().is_empty());
            assert!(store.ping().await.is_ok());
        });
    }

    #[test]
    fn test_replace_schedule_discards_previous() {
        let store = InMemoryLeagueStore::new();
        tokio_test::block_on(async {
            store
                .replace_schedule(vec![entry("1"), entry("2")])
                .await
                .unwrap();
            let stored = store.replace_schedule(vec![entry("9")]).await.unwrap();

            assert_eq!(stored, 1);
            assert_eq!(
                store.schedule().await.unwrap()[0].game_id.as_deref(),
                Some("9")
            );
        });
    }

    #[test]
    fn test_upsert_scores_merges_by_game_id() {
        let store = InMemoryLeagueStore::with_data(
            Vec::new(),
            vec![GameResult::new("1", date(), "A", "B", 10, 8)],
        );
        tokio_test::block_on(async {
            let total = store
                .upsert_scores(vec![
                    GameResult::new("1", date(), "A", "B", 12, 8),
                    GameResult::new("2", date(), "C", "D", 3, 4),
                ])
                .await
                .unwrap();

            assert_eq!(total, 2);
            let scores = store.list_results().await.unwrap();
            assert_eq!(scores[0].score_a, 12);
        });
    }

    #[test]
    fn test_recap_crud() {
        let store = InMemoryLeagueStore::new();
        tokio_test::block_on(async {
            store.upsert_recap(recap("7")).await.unwrap();
            let mut edited = recap("7");
            edited.attendance = 60;
            store.upsert_recap(edited).await.unwrap();

            assert_eq!(store.recaps().await.unwrap().len(), 1);
            assert_eq!(store.recap("7").await.unwrap().unwrap().attendance, 60);
            assert!(store.recap("8").await.unwrap().is_none());

            assert!(store.delete_recap("7").await.unwrap());
            assert!(!store.delete_recap("7").await.unwrap());
        });
    }
}
