//! League-wide scoring totals

use crate::types::{GameResult, ScoresStats};
use crate::utils::round_to_tenth;

pub fn scores_stats(results: &[GameResult]) -> ScoresStats {
    let total_points = results
        .iter()
        .fold(0i64, |sum, r| sum.saturating_add(r.total_points()));

    let average_points_per_game = if results.is_empty() {
        0.0
    } else {
        round_to_tenth(total_points as f64 / results.len() as f64)
    };

    ScoresStats {
        total_games: results.len(),
        total_points,
        average_points_per_game,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_stats_over_games() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let results = vec![
            GameResult::new("11", date, "LOCKDOWN", "MANA HAWAII", 40, 38),
            GameResult::new("12", date, "SHARKS", "MANA HAWAII", 51, 30),
            GameResult::new("13", date, "MANAFEST", "RAINJAHZ", 44, 44),
        ];
        let stats = scores_stats(&results);

        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_points, 247);
        assert_eq!(stats.average_points_per_game, 82.3);
    }

    #[test]
    fn test_stats_without_games() {
        let stats = scores_stats(&[]);
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.average_points_per_game, 0.0);
    }
}
