//! Standings aggregation
//!
//! A single pass folds every game into per-team accumulators, then the table
//! is ranked by wins and average point differential. The fold is commutative
//! per team, so input order never changes the totals.

use crate::types::{GameResult, TeamStanding};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Running totals for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Accumulator {
    wins: u32,
    losses: u32,
    points_for: i64,
    points_against: i64,
}

impl Accumulator {
    /// Record one game from this team's side
    fn record(&mut self, scored: i64, allowed: i64) {
        self.points_for = self.points_for.saturating_add(scored);
        self.points_against = self.points_against.saturating_add(allowed);

        match scored.cmp(&allowed) {
            Ordering::Greater => self.wins = self.wins.saturating_add(1),
            Ordering::Less => self.losses = self.losses.saturating_add(1),
            // ties count toward neither column
            Ordering::Equal => {}
        }
    }

    fn into_standing(self, team: &str) -> TeamStanding {
        let games_played = self.wins.saturating_add(self.losses);
        let point_differential = self.points_for.saturating_sub(self.points_against);
        let avg_point_differential = if games_played > 0 {
            point_differential as f64 / games_played as f64
        } else {
            0.0
        };

        TeamStanding {
            rank: 0,
            team: team.to_string(),
            wins: self.wins,
            losses: self.losses,
            games_played,
            points_for: self.points_for,
            points_against: self.points_against,
            point_differential,
            avg_point_differential,
        }
    }
}

/// Build the ranked standings table from a set of game results.
///
/// Teams appear only if they played at least one recorded game. Scores are
/// not validated here; a self-game credits both sides to the same team.
pub fn compute_standings(results: &[GameResult]) -> Vec<TeamStanding> {
    let mut table: HashMap<&str, Accumulator> = HashMap::new();

    for result in results {
        table
            .entry(result.team_a.as_str())
            .or_default()
            .record(result.score_a, result.score_b);
        table
            .entry(result.team_b.as_str())
            .or_default()
            .record(result.score_b, result.score_a);
    }

    let mut standings: Vec<TeamStanding> = table
        .into_iter()
        .map(|(team, totals)| totals.into_standing(team))
        .collect();

    standings.sort_by(rank_order);
    for (index, standing) in standings.iter_mut().enumerate() {
        standing.rank = index + 1;
    }

    standings
}

/// Wins descending, then average differential descending, then team name
pub fn rank_order(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.avg_point_differential.total_cmp(&a.avg_point_differential))
        .then_with(|| a.team.cmp(&b.team))
}
