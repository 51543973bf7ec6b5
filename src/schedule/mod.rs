//! Schedule presentation
//!
//! Turns stored schedule entries into the rows the public schedule page shows:
//! status relative to a given day, the venue, and the final score when one has
//! been uploaded.

use crate::types::{
    GameResult, GameScore, GameStatus, ScheduleEntry, ScheduledGame, TeamName,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Home gym for every league game
pub const DEFAULT_VENUE: &str = "Manoa Basketball Gym";

/// Name fragments of bracket slots that are not real teams
pub const PLACEHOLDER_MARKERS: &[&str] = &["SEED", "WINNER", "LOSER", "GM"];

/// Status of `entry` as seen on `today`; playoff games always read as playoff
pub fn game_status(entry: &ScheduleEntry, today: NaiveDate) -> GameStatus {
    if entry.is_playoff {
        return GameStatus::Playoff;
    }

    match entry.date.cmp(&today) {
        std::cmp::Ordering::Less => GameStatus::Completed,
        std::cmp::Ordering::Equal => GameStatus::Today,
        std::cmp::Ordering::Greater => GameStatus::Scheduled,
    }
}

/// Build presentation rows in upload order, numbered from 1
pub fn build_schedule(
    entries: &[ScheduleEntry],
    scores: &[GameResult],
    today: NaiveDate,
    venue: &str,
) -> Vec<ScheduledGame> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| ScheduledGame {
            id: index + 1,
            game_id: entry.game_id.clone(),
            date: entry.date,
            time: entry.time,
            team1: entry.team1.clone(),
            team2: entry.team2.clone(),
            location: venue.to_string(),
            status: game_status(entry, today),
            is_playoff: entry.is_playoff,
            score: find_score(entry, scores),
        })
        .collect()
}

/// Score for a scheduled game, oriented to the entry's team1/team2.
///
/// Matches on game id first. Entries without a recorded id fall back to the
/// date and pairing, in either team order.
pub fn find_score(entry: &ScheduleEntry, scores: &[GameResult]) -> Option<GameScore> {
    if let Some(game_id) = &entry.game_id {
        if let Some(result) = scores.iter().find(|r| &r.game_id == game_id) {
            return Some(orient(entry, result));
        }
    }

    scores
        .iter()
        .find(|r| r.date == entry.date && r.team_a == entry.team1 && r.team_b == entry.team2)
        .or_else(|| {
            scores.iter().find(|r| {
                r.date == entry.date && r.team_a == entry.team2 && r.team_b == entry.team1
            })
        })
        .map(|result| orient(entry, result))
}

fn orient(entry: &ScheduleEntry, result: &GameResult) -> GameScore {
    if result.team_a == entry.team2 && result.team_b == entry.team1 {
        GameScore {
            score1: result.score_b,
            score2: result.score_a,
        }
    } else {
        GameScore {
            score1: result.score_a,
            score2: result.score_b,
        }
    }
}

pub fn is_placeholder_team(name: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Sorted unique real team names appearing in the schedule
pub fn teams(entries: &[ScheduleEntry]) -> Vec<TeamName> {
    entries
        .iter()
        .flat_map(|e| [e.team1.as_str(), e.team2.as_str()])
        .filter(|name| !is_placeholder_team(name))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
