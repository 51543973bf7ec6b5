//! League operations
//!
//! The layer between the HTTP handlers and the store: uploads are parsed and
//! validated here, standings are computed here, and every operation is timed
//! into the metrics collector.

use crate::error::{LeagueError, Result};
use crate::ingest::{parse_schedule, parse_scores};
use crate::metrics::MetricsCollector;
use crate::schedule::{build_schedule, teams};
use crate::standings::{compute_standings, scores_stats};
use crate::storage::{LeagueStore, ResultsProvider};
use crate::types::{
    GameResult, Recap, ScheduledGame, ScoresStats, TeamName, TeamStanding, UploadKind,
    UploadSummary,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counts shown on the stats probe
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeagueCounts {
    pub scheduled_games: usize,
    pub scores: usize,
    pub recaps: usize,
    pub teams: usize,
}

/// Compute standings from any results source
pub async fn standings_from<P>(provider: &P) -> Result<Vec<TeamStanding>>
where
    P: ResultsProvider + ?Sized,
{
    let results = provider.list_results().await?;
    Ok(compute_standings(&results))
}

pub struct LeagueService {
    store: Arc<dyn LeagueStore>,
    metrics: Arc<MetricsCollector>,
    venue: String,
    require_scheduled_games: bool,
}

impl LeagueService {
    pub fn new(
        store: Arc<dyn LeagueStore>,
        metrics: Arc<MetricsCollector>,
        venue: impl Into<String>,
        require_scheduled_games: bool,
    ) -> Self {
        Self {
            store,
            metrics,
            venue: venue.into(),
            require_scheduled_games,
        }
    }

    pub fn store(&self) -> Arc<dyn LeagueStore> {
        self.store.clone()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    /// Ranked standings over every stored result
    pub async fn standings(&self) -> Result<Vec<TeamStanding>> {
        let results = self.scores().await?;

        let timer = self.metrics.start_timer();
        let standings = compute_standings(&results);
        let elapsed = timer.stop();

        self.metrics.record_standings(standings.len(), elapsed);
        debug!(
            "Computed standings for {} teams from {} games in {:?}",
            standings.len(),
            results.len(),
            elapsed
        );
        Ok(standings)
    }

    pub async fn scores(&self) -> Result<Vec<GameResult>> {
        let timer = self.metrics.start_timer();
        let results = self.store.list_results().await;
        self.metrics.record_storage_operation("list_results", timer.stop());
        results
    }

    pub async fn scores_stats(&self) -> Result<ScoresStats> {
        Ok(scores_stats(&self.scores().await?))
    }

    /// Schedule with statuses as of `today` and any matching scores attached
    pub async fn schedule(&self, today: NaiveDate) -> Result<Vec<ScheduledGame>> {
        let timer = self.metrics.start_timer();
        let entries = self.store.schedule().await?;
        self.metrics.record_storage_operation("schedule", timer.stop());

        let scores = self.scores().await?;
        Ok(build_schedule(&entries, &scores, today, &self.venue))
    }

    pub async fn teams(&self) -> Result<Vec<TeamName>> {
        Ok(teams(&self.store.schedule().await?))
    }

    /// Replace the schedule with the games in `content`
    pub async fn upload_schedule(&self, content: &str) -> Result<UploadSummary> {
        let kind = UploadKind::Schedule;
        let parsed = self.parse_or_reject(kind, parse_schedule(content))?;
        let rejected = parsed.errors.len();

        if parsed.records.is_empty() {
            self.metrics.record_upload_rejected(kind, rejected);
            return Err(LeagueError::InvalidUpload {
                reason: "No valid games found in CSV".to_string(),
                details: parsed.errors,
            }
            .into());
        }

        let accepted = parsed.records.len();
        let timer = self.metrics.start_timer();
        let stored_total = self.store.replace_schedule(parsed.records).await?;
        self.metrics
            .record_storage_operation("replace_schedule", timer.stop());
        self.metrics.record_upload(kind, rejected, stored_total);

        info!(
            "Schedule uploaded: {} games stored, {} rows rejected",
            stored_total, rejected
        );
        Ok(UploadSummary {
            kind,
            accepted,
            rejected,
            stored_total,
            message: format!("Successfully uploaded {} games", accepted),
            errors: parsed.errors,
        })
    }

    /// Merge the scores in `content` into the stored results
    pub async fn upload_scores(&self, content: &str) -> Result<UploadSummary> {
        let kind = UploadKind::Scores;
        let parsed = self.parse_or_reject(kind, parse_scores(content))?;
        let rejected = parsed.errors.len();

        if parsed.records.is_empty() {
            self.metrics.record_upload_rejected(kind, rejected);
            return Err(LeagueError::InvalidUpload {
                reason: "No valid scores found in CSV".to_string(),
                details: parsed.errors,
            }
            .into());
        }

        if self.require_scheduled_games {
            if let Err(e) = self.check_scheduled(&parsed.records).await {
                self.metrics.record_upload_rejected(kind, rejected);
                return Err(e);
            }
        }

        let accepted = parsed.records.len();
        let timer = self.metrics.start_timer();
        let stored_total = self.store.upsert_scores(parsed.records).await?;
        self.metrics
            .record_storage_operation("upsert_scores", timer.stop());
        self.metrics.record_upload(kind, rejected, stored_total);

        info!(
            "Scores uploaded: {} accepted, {} rejected, {} stored",
            accepted, rejected, stored_total
        );
        Ok(UploadSummary {
            kind,
            accepted,
            rejected,
            stored_total,
            message: format!("Successfully uploaded {} scores", accepted),
            errors: parsed.errors,
        })
    }

    fn parse_or_reject<T>(
        &self,
        kind: UploadKind,
        parsed: Result<crate::ingest::ParsedUpload<T>>,
    ) -> Result<crate::ingest::ParsedUpload<T>> {
        parsed.map_err(|e| {
            warn!("Rejected {} upload: {}", kind, e);
            self.metrics.record_upload_rejected(kind, 0);
            e
        })
    }

    /// Every score must reference a game id from the stored schedule
    async fn check_scheduled(&self, results: &[GameResult]) -> Result<()> {
        let schedule = self.store.schedule().await?;
        let known: HashSet<&str> = schedule
            .iter()
            .filter_map(|e| e.game_id.as_deref())
            .collect();

        let mut unknown: Vec<String> = Vec::new();
        for result in results {
            if !known.contains(result.game_id.as_str()) && !unknown.contains(&result.game_id) {
                unknown.push(result.game_id.clone());
            }
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            warn!("Scores reference unscheduled games: {}", unknown.join(", "));
            Err(LeagueError::UnknownGameIds { ids: unknown }.into())
        }
    }

    pub async fn recaps(&self) -> Result<Vec<Recap>> {
        self.store.recaps().await
    }

    pub async fn recap(&self, game_id: &str) -> Result<Recap> {
        self.store
            .recap(game_id)
            .await?
            .ok_or_else(|| {
                LeagueError::RecapNotFound {
                    game_id: game_id.to_string(),
                }
                .into()
            })
    }

    pub async fn save_recap(&self, recap: Recap) -> Result<Recap> {
        if recap.game_id.trim().is_empty() {
            return Err(LeagueError::invalid_upload("Recap requires a game id").into());
        }

        self.store.upsert_recap(recap.clone()).await?;
        self.metrics.record_recap_operation("save");
        info!("Saved recap for game {}", recap.game_id);
        Ok(recap)
    }

    pub async fn delete_recap(&self, game_id: &str) -> Result<()> {
        if !self.store.delete_recap(game_id).await? {
            return Err(LeagueError::RecapNotFound {
                game_id: game_id.to_string(),
            }
            .into());
        }

        self.metrics.record_recap_operation("delete");
        info!("Deleted recap for game {}", game_id);
        Ok(())
    }

    pub async fn counts(&self) -> Result<LeagueCounts> {
        let schedule = self.store.schedule().await?;
        Ok(LeagueCounts {
            scheduled_games: schedule.len(),
            scores: self.store.list_results().await?.len(),
            recaps: self.store.recaps().await?.len(),
            teams: teams(&schedule).len(),
        })
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryLeagueStore, MockResultsProvider};

    const SCHEDULE: &str = "\
gameID,Date,Team 1,Team 2,Time
4,10/11/25,BIG TIME,MANA HAWAII,6:10
5,10/11/25,LOCKDOWN,SHARKS,7:20
,11/22/25,1ST SEED,4TH SEED,6:10
";

    const SCORES: &str = "\
gameID,Date,Team 1,Team 2,Score 1,Score 2
4,10/11/25,BIG TIME,MANA HAWAII,42,38
5,10/11/25,LOCKDOWN,SHARKS,40,44
";

    fn service(require_scheduled_games: bool) -> LeagueService {
        LeagueService::new(
            Arc::new(InMemoryLeagueStore::new()),
            Arc::new(MetricsCollector::new().unwrap()),
            crate::schedule::DEFAULT_VENUE,
            require_scheduled_games,
        )
    }

    fn league_error(err: &anyhow::Error) -> &LeagueError {
        err.downcast_ref::<LeagueError>()
            .unwrap_or_else(|| panic!("not a league error: {}", err))
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_standings_from_mocked_provider() {
        let mut provider = MockResultsProvider::new();
        provider.expect_list_results().returning(|| {
            Ok(vec![
                GameResult::new("1", date(10, 11), "A", "B", 10, 8),
                GameResult::new("2", date(10, 11), "A", "B", 5, 9),
                GameResult::new("3", date(10, 18), "B", "A", 7, 7),
            ])
        });

        let standings = standings_from(&provider).await.unwrap();
        assert_eq!(standings[0].team, "B");
        assert_eq!(standings[0].avg_point_differential, 1.0);
    }

    #[tokio::test]
    async fn test_standings_from_propagates_provider_failure() {
        let mut provider = MockResultsProvider::new();
        provider
            .expect_list_results()
            .returning(|| Err(LeagueError::storage("scores.csv unreadable").into()));

        let err = standings_from(&provider).await.unwrap_err();
        assert!(matches!(
            league_error(&err),
            LeagueError::StorageUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_standings() {
        let league = service(true);
        assert!(league.standings().await.unwrap().is_empty());
        assert_eq!(league.scores_stats().await.unwrap().total_games, 0);
    }

    #[tokio::test]
    async fn test_upload_schedule_then_scores() {
        let league = service(true);

        let summary = league.upload_schedule(SCHEDULE).await.unwrap();
        assert_eq!(summary.kind, UploadKind::Schedule);
        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.message, "Successfully uploaded 3 games");

        let summary = league.upload_scores(SCORES).await.unwrap();
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.stored_total, 2);

        let standings = league.standings().await.unwrap();
        let teams: Vec<&str> = standings.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(teams, vec!["BIG TIME", "SHARKS", "LOCKDOWN", "MANA HAWAII"]);

        let schedule = league.schedule(date(10, 20)).await.unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].score.map(|s| s.score1), Some(42));
        assert_eq!(schedule[2].status, crate::types::GameStatus::Playoff);

        assert_eq!(
            league.teams().await.unwrap(),
            vec!["BIG TIME", "LOCKDOWN", "MANA HAWAII", "SHARKS"]
        );
    }

    #[tokio::test]
    async fn test_scores_for_unscheduled_games_are_refused() {
        let league = service(true);
        league.upload_schedule(SCHEDULE).await.unwrap();

        let err = league
            .upload_scores(
                "gameID,Date,Team 1,Team 2,Score 1,Score 2\n4,10/11/25,BIG TIME,MANA HAWAII,42,38\n41,10/25/25,A,B,1,2\n",
            )
            .await
            .unwrap_err();

        match league_error(&err) {
            LeagueError::UnknownGameIds { ids } => assert_eq!(ids, &vec!["41".to_string()]),
            other => panic!("unexpected error: {}", other),
        }
        assert!(league.scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_check_can_be_disabled() {
        let league = service(false);
        let summary = league.upload_scores(SCORES).await.unwrap();
        assert_eq!(summary.stored_total, 2);
    }

    #[tokio::test]
    async fn test_upload_with_no_valid_rows_reports_details() {
        let league = service(false);
        let err = league
            .upload_scores("gameID,Date,Team 1,Team 2,Score 1,Score 2\n4,10/11/25,A,B,x,2\n")
            .await
            .unwrap_err();

        match league_error(&err) {
            LeagueError::InvalidUpload { reason, details } => {
                assert_eq!(reason, "No valid scores found in CSV");
                assert_eq!(details.len(), 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_upload_reports_rejected_rows() {
        let league = service(false);
        let summary = league
            .upload_scores(
                "gameID,Date,Team 1,Team 2,Score 1,Score 2\n4,10/11/25,A,B,3,2\n5,10/11/25,C,C,1,0\n",
            )
            .await
            .unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.rejected, 1);
        assert!(summary.errors[0].starts_with("line 3"));
    }

    #[tokio::test]
    async fn test_missing_column_fails_upload() {
        let league = service(true);
        let err = league
            .upload_schedule("gameID,Date,Team 1,Team 2\n4,10/11/25,A,B\n")
            .await
            .unwrap_err();
        assert!(matches!(
            league_error(&err),
            LeagueError::InvalidUpload { .. }
        ));
    }

    #[tokio::test]
    async fn test_recap_lifecycle() {
        let league = service(true);
        let recap = Recap {
            game_id: "4".to_string(),
            date: date(10, 11),
            time: "6:10 PM".to_string(),
            team1: "BIG TIME".to_string(),
            team2: "MANA HAWAII".to_string(),
            score1: 42,
            score2: 38,
            location: crate::schedule::DEFAULT_VENUE.to_string(),
            highlights: vec!["Strong second half".to_string()],
            player_of_the_match: "N. Kealoha".to_string(),
            attendance: 52,
            weather: "Humid".to_string(),
            recap: None,
        };

        league.save_recap(recap.clone()).await.unwrap();
        assert_eq!(league.recap("4").await.unwrap(), recap);
        assert_eq!(league.recaps().await.unwrap().len(), 1);

        league.delete_recap("4").await.unwrap();
        let err = league.recap("4").await.unwrap_err();
        assert!(matches!(
            league_error(&err),
            LeagueError::RecapNotFound { .. }
        ));
        let err = league.delete_recap("4").await.unwrap_err();
        assert!(matches!(
            league_error(&err),
            LeagueError::RecapNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_recap_without_game_id_is_invalid() {
        let league = service(true);
        let recap: Recap = serde_json::from_value(serde_json::json!({
            "game_id": " ",
            "date": "2025-10-11",
            "team1": "A",
            "team2": "B",
            "score1": 1,
            "score2": 0
        }))
        .unwrap();

        let err = league.save_recap(recap).await.unwrap_err();
        assert!(matches!(
            league_error(&err),
            LeagueError::InvalidUpload { .. }
        ));
    }

    #[tokio::test]
    async fn test_counts() {
        let league = service(true);
        league.upload_schedule(SCHEDULE).await.unwrap();
        league.upload_scores(SCORES).await.unwrap();

        let counts = league.counts().await.unwrap();
        assert_eq!(counts.scheduled_games, 3);
        assert_eq!(counts.scores, 2);
        assert_eq!(counts.teams, 4);
    }
}
