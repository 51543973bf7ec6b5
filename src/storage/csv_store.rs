//! CSV file league store
//!
//! Keeps `schedule.csv`, `scores.csv` and `recaps.csv` in one data directory,
//! the same files league admins maintain in a spreadsheet. Every write goes to
//! a scratch file that is renamed over the target, and a single mutex
//! serializes read-merge-write cycles so concurrent uploads cannot interleave.

use super::{merge_recap, merge_scores, LeagueStore, ResultsProvider};
use crate::error::{LeagueError, Result};
use crate::ingest::{parse_league_date, parse_schedule, parse_scores};
use crate::types::{GameResult, Recap, ScheduleEntry};
use crate::utils::scratch_suffix;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

pub const SCHEDULE_FILE: &str = "schedule.csv";
pub const SCORES_FILE: &str = "scores.csv";
pub const RECAPS_FILE: &str = "recaps.csv";

pub const SCORES_HEADERS: [&str; 6] = ["gameID", "Date", "Team 1", "Team 2", "Score 1", "Score 2"];
pub const SCHEDULE_HEADERS: [&str; 5] = ["gameID", "Date", "Team 1", "Team 2", "Time"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const HIGHLIGHT_SEPARATOR: char = '|';

#[derive(Debug)]
pub struct CsvLeagueStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLeagueStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// File contents, or `None` when the file has not been written yet
    async fn read_file(&self, file: &str) -> Result<Option<String>> {
        let path = self.path(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                Err(LeagueError::storage(format!("Failed to read {}: {}", file, e)).into())
            }
        }
    }

    async fn write_file(&self, file: &str, content: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| LeagueError::storage(format!("Failed to create data directory: {}", e)))?;

        let target = self.path(file);
        let scratch = self.path(&format!(".{}.{}.tmp", file, scratch_suffix()));

        if let Err(e) = tokio::fs::write(&scratch, content).await {
            error!("Failed to write {}: {}", scratch.display(), e);
            return Err(LeagueError::storage(format!("Failed to write {}: {}", file, e)).into());
        }

        if let Err(e) = tokio::fs::rename(&scratch, &target).await {
            error!("Failed to replace {}: {}", target.display(), e);
            let _ = tokio::fs::remove_file(&scratch).await;
            return Err(LeagueError::storage(format!("Failed to replace {}: {}", file, e)).into());
        }

        debug!("Wrote {}", target.display());
        Ok(())
    }

    async fn load_scores(&self) -> Result<Vec<GameResult>> {
        let Some(content) = self.read_file(SCORES_FILE).await? else {
            return Ok(Vec::new());
        };
        let parsed = parse_scores(&content).map_err(|e| stored_file_error(SCORES_FILE, e))?;
        for message in &parsed.errors {
            warn!("Skipping stored score row in {}: {}", SCORES_FILE, message);
        }
        Ok(parsed.records)
    }

    async fn load_schedule(&self) -> Result<Vec<ScheduleEntry>> {
        let Some(content) = self.read_file(SCHEDULE_FILE).await? else {
            return Ok(Vec::new());
        };
        let parsed = parse_schedule(&content).map_err(|e| stored_file_error(SCHEDULE_FILE, e))?;
        for message in &parsed.errors {
            warn!("Skipping stored schedule row in {}: {}", SCHEDULE_FILE, message);
        }
        Ok(parsed.records)
    }

    async fn load_recaps(&self) -> Result<Vec<Recap>> {
        let Some(content) = self.read_file(RECAPS_FILE).await? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut recaps = Vec::new();
        for (index, record) in reader.deserialize::<RecapRecord>().enumerate() {
            let parsed = record
                .map_err(|e| e.to_string())
                .and_then(RecapRecord::into_recap);
            match parsed {
                Ok(recap) => recaps.push(recap),
                // header is line 1
                Err(reason) => warn!(
                    "Skipping stored recap on line {} of {}: {}",
                    index + 2,
                    RECAPS_FILE,
                    reason
                ),
            }
        }
        Ok(recaps)
    }

    async fn save_recaps(&self, recaps: &[Recap]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for recap in recaps {
            writer
                .serialize(RecapRecord::from(recap))
                .map_err(encode_error)?;
        }
        let bytes = writer.into_inner().map_err(|e| encode_error(e.into_error()))?;
        self.write_file(RECAPS_FILE, bytes).await
    }
}

fn stored_file_error(file: &str, e: anyhow::Error) -> anyhow::Error {
    LeagueError::storage(format!("{} is not a valid league file: {}", file, e)).into()
}

fn encode_error(e: impl std::fmt::Display) -> anyhow::Error {
    LeagueError::InternalError {
        message: format!("Failed to encode CSV: {}", e),
    }
    .into()
}

/// Scores in canonical column order
pub fn encode_scores(results: &[GameResult]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SCORES_HEADERS).map_err(encode_error)?;
    for r in results {
        writer
            .write_record([
                r.game_id.clone(),
                r.date.format(DATE_FORMAT).to_string(),
                r.team_a.clone(),
                r.team_b.clone(),
                r.score_a.to_string(),
                r.score_b.to_string(),
            ])
            .map_err(encode_error)?;
    }
    writer.into_inner().map_err(|e| encode_error(e.into_error()))
}

/// Schedule in canonical column order; times are written as 24h
pub fn encode_schedule(entries: &[ScheduleEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SCHEDULE_HEADERS).map_err(encode_error)?;
    for e in entries {
        writer
            .write_record([
                e.game_id.clone().unwrap_or_default(),
                e.date.format(DATE_FORMAT).to_string(),
                e.team1.clone(),
                e.team2.clone(),
                e.time.format(TIME_FORMAT).to_string(),
            ])
            .map_err(encode_error)?;
    }
    writer.into_inner().map_err(|e| encode_error(e.into_error()))
}

/// Row layout of `recaps.csv`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecapRecord {
    game_id: String,
    date: String,
    #[serde(default)]
    time: String,
    team1: String,
    team2: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    score1: Option<i64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    score2: Option<i64>,
    #[serde(default)]
    location: String,
    #[serde(default)]
    highlights: String,
    #[serde(default)]
    player_of_the_match: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    attendance: Option<u32>,
    #[serde(default)]
    weather: String,
    #[serde(default)]
    recap: String,
}

impl RecapRecord {
    fn into_recap(self) -> std::result::Result<Recap, String> {
        if self.game_id.is_empty() {
            return Err("missing gameId".to_string());
        }
        let date = parse_league_date(&self.date)
            .ok_or_else(|| format!("unrecognised date '{}'", self.date))?;

        Ok(Recap {
            game_id: self.game_id,
            date,
            time: self.time,
            team1: self.team1,
            team2: self.team2,
            score1: self.score1.unwrap_or(0),
            score2: self.score2.unwrap_or(0),
            location: self.location,
            highlights: self
                .highlights
                .split(HIGHLIGHT_SEPARATOR)
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect(),
            player_of_the_match: self.player_of_the_match,
            attendance: self.attendance.unwrap_or(0),
            weather: self.weather,
            recap: (!self.recap.is_empty()).then_some(self.recap),
        })
    }
}

impl From<&Recap> for RecapRecord {
    fn from(recap: &Recap) -> Self {
        Self {
            game_id: recap.game_id.clone(),
            date: recap.date.format(DATE_FORMAT).to_string(),
            time: recap.time.clone(),
            team1: recap.team1.clone(),
            team2: recap.team2.clone(),
            score1: Some(recap.score1),
            score2: Some(recap.score2),
            location: recap.location.clone(),
            highlights: recap
                .highlights
                .join(&HIGHLIGHT_SEPARATOR.to_string()),
            player_of_the_match: recap.player_of_the_match.clone(),
            attendance: Some(recap.attendance),
            weather: recap.weather.clone(),
            recap: recap.recap.clone().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ResultsProvider for CsvLeagueStore {
    async fn list_results(&self) -> Result<Vec<GameResult>> {
        self.load_scores().await
    }
}

#[async_trait]
impl LeagueStore for CsvLeagueStore {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    async fn schedule(&self) -> Result<Vec<ScheduleEntry>> {
        self.load_schedule().await
    }

    async fn replace_schedule(&self, entries: Vec<ScheduleEntry>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        self.write_file(SCHEDULE_FILE, encode_schedule(&entries)?)
            .await?;
        Ok(entries.len())
    }

    async fn upsert_scores(&self, results: Vec<GameResult>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let merged = merge_scores(self.load_scores().await?, results);
        self.write_file(SCORES_FILE, encode_scores(&merged)?).await?;
        Ok(merged.len())
    }

    async fn recaps(&self) -> Result<Vec<Recap>> {
        self.load_recaps().await
    }

    async fn recap(&self, game_id: &str) -> Result<Option<Recap>> {
        Ok(self
            .load_recaps()
            .await?
            .into_iter()
            .find(|r| r.game_id == game_id))
    }

    async fn upsert_recap(&self, recap: Recap) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut recaps = self.load_recaps().await?;
        merge_recap(&mut recaps, recap);
        self.save_recaps(&recaps).await
    }

    async fn delete_recap(&self, game_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut recaps = self.load_recaps().await?;
        let before = recaps.len();
        recaps.retain(|r| r.game_id != game_id);
        if recaps.len() == before {
            return Ok(false);
        }
        self.save_recaps(&recaps).await?;
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        match tokio::fs::metadata(&self.data_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(LeagueError::storage(format!(
                "{} is not a directory",
                self.data_dir.display()
            ))
            .into()),
            // first write creates it
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LeagueError::storage(format!(
                "Cannot access {}: {}",
                self.data_dir.display(),
                e
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rec-league-store-{}", uuid::Uuid::new_v4()))
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 11).unwrap()
    }

    fn recap(id: &str) -> Recap {
        Recap {
            game_id: id.to_string(),
            date: date(),
            time: "6:10 PM".to_string(),
            team1: "JAMMERS".to_string(),
            team2: "SHARKS".to_string(),
            score1: 51,
            score2: 47,
            location: "Manoa Basketball Gym".to_string(),
            highlights: vec!["12-0 run".to_string(), "Late block, sealed it".to_string()],
            player_of_the_match: "L. Akana".to_string(),
            attendance: 38,
            weather: "Trade winds".to_string(),
            recap: Some("Jammers pulled away late.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_files_read_as_empty() {
        let store = CsvLeagueStore::new(scratch_dir());

        assert!(store.list_results().await.unwrap().is_empty());
        assert!(store.schedule().await.unwrap().is_empty());
        assert!(store.recaps().await.unwrap().is_empty());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_scores_persist_with_canonical_headers() {
        let dir = scratch_dir();
        let store = CsvLeagueStore::new(&dir);

        let total = store
            .upsert_scores(vec![
                GameResult::new("4", date(), "BIG TIME", "MANA HAWAII", 42, 38),
                GameResult::new("5", date(), "LOCKDOWN", "SHARKS", 40, 44),
            ])
            .await
            .unwrap();
        assert_eq!(total, 2);

        let raw = tokio::fs::read_to_string(dir.join(SCORES_FILE)).await.unwrap();
        assert!(raw.starts_with("gameID,Date,Team 1,Team 2,Score 1,Score 2\n"));
        assert!(raw.contains("4,2025-10-11,BIG TIME,MANA HAWAII,42,38"));

        let reopened = CsvLeagueStore::new(&dir);
        let results = reopened.list_results().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].team_b, "SHARKS");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_upsert_scores_replaces_existing_game() {
        let dir = scratch_dir();
        let store = CsvLeagueStore::new(&dir);

        store
            .upsert_scores(vec![GameResult::new("4", date(), "A", "B", 1, 2)])
            .await
            .unwrap();
        let total = store
            .upsert_scores(vec![GameResult::new("4", date(), "A", "B", 3, 2)])
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(store.list_results().await.unwrap()[0].score_a, 3);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_schedule_round_trips_placeholder_rows() {
        let dir = scratch_dir();
        let store = CsvLeagueStore::new(&dir);
        let entries = vec![
            ScheduleEntry {
                game_id: Some("21".to_string()),
                date: NaiveDate::from_ymd_opt(2025, 11, 8).unwrap(),
                time: NaiveTime::from_hms_opt(19, 20, 0).unwrap(),
                team1: "LOCKDOWN".to_string(),
                team2: "RAINJAHZ".to_string(),
                is_playoff: false,
            },
            ScheduleEntry {
                game_id: None,
                date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
                time: NaiveTime::from_hms_opt(18, 10, 0).unwrap(),
                team1: "1ST SEED".to_string(),
                team2: "4TH SEED".to_string(),
                is_playoff: true,
            },
        ];

        assert_eq!(store.replace_schedule(entries.clone()).await.unwrap(), 2);
        assert_eq!(store.schedule().await.unwrap(), entries);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_recaps_keep_highlights_and_optional_text() {
        let dir = scratch_dir();
        let store = CsvLeagueStore::new(&dir);

        store.upsert_recap(recap("7")).await.unwrap();
        let mut bare = recap("8");
        bare.highlights.clear();
        bare.recap = None;
        store.upsert_recap(bare.clone()).await.unwrap();

        let raw = tokio::fs::read_to_string(dir.join(RECAPS_FILE)).await.unwrap();
        assert!(raw.starts_with("gameId,date,time,team1,team2,score1,score2,location,highlights,playerOfTheMatch,attendance,weather,recap\n"));

        assert_eq!(store.recap("7").await.unwrap(), Some(recap("7")));
        assert_eq!(store.recap("8").await.unwrap(), Some(bare));

        assert!(store.delete_recap("7").await.unwrap());
        assert!(!store.delete_recap("7").await.unwrap());
        assert_eq!(store.recaps().await.unwrap().len(), 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_hand_edited_scores_file_is_read() {
        let dir = scratch_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(
            dir.join(SCORES_FILE),
            "gameID,Date,Team 1,Team 2,Score 1,Score 2\n4,10/11/25,BIG TIME,MANA HAWAII,42,38\n5,10/11/25,LOCKDOWN,SHARKS,,\n",
        )
        .await
        .unwrap();

        let results = CsvLeagueStore::new(&dir).list_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].date, date());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_unreadable_store_is_unavailable() {
        let dir = scratch_dir();
        tokio::fs::create_dir_all(dir.join(SCORES_FILE)).await.unwrap();

        let err = CsvLeagueStore::new(&dir).list_results().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LeagueError>(),
            Some(LeagueError::StorageUnavailable { .. })
        ));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_ping_rejects_file_as_data_dir() {
        let path = scratch_dir();
        tokio::fs::write(&path, "not a dir").await.unwrap();

        assert!(CsvLeagueStore::new(&path).ping().await.is_err());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
