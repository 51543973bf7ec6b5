//! Column mapping from uploaded CSV headers to typed league records
//!
//! Spreadsheets exported by different admins name the same column several
//! ways. The header row is resolved against the alias lists once per upload;
//! every row after that is read by index into strongly-typed records.

use super::table::{read_table, CsvRow, CsvTable, NO_GAME};
use crate::error::{LeagueError, Result};
use crate::types::{GameResult, ScheduleEntry};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;

/// Hours before noon from this one on are evening tip-offs written in 12h form
pub const EVENING_START_HOUR: u32 = 5;

/// Team-name fragments that mark a playoff bracket slot
pub const PLAYOFF_MARKERS: &[&str] = &["SEED", "WINNER", "LOSER"];

/// Logical columns the league understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    GameId,
    Date,
    Team1,
    Team2,
    Score1,
    Score2,
    Time,
}

impl Column {
    /// Accepted header spellings, in priority order
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::GameId => &["gameID", "GameID", "game_id", "Game ID"],
            Column::Date => &["Date", "date"],
            Column::Team1 => &["Team 1", "Team1", "team1", "team_1"],
            Column::Team2 => &["Team 2", "Team2", "team2", "team_2"],
            Column::Score1 => &["Score 1", "Score1", "score1", "score_1"],
            Column::Score2 => &["Score 2", "Score2", "score2", "score_2"],
            Column::Time => &["Time", "time"],
        }
    }

    /// Canonical header, also used in row error messages
    pub fn label(self) -> &'static str {
        self.aliases()[0]
    }
}

const ALL_COLUMNS: [Column; 7] = [
    Column::GameId,
    Column::Date,
    Column::Team1,
    Column::Team2,
    Column::Score1,
    Column::Score2,
    Column::Time,
];

/// Header positions for each known column present in a table
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Self {
        let mut indices = HashMap::new();
        for column in ALL_COLUMNS {
            let found = column
                .aliases()
                .iter()
                .find_map(|alias| headers.iter().position(|h| h == alias));
            if let Some(index) = found {
                indices.insert(column, index);
            }
        }
        Self { indices }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.indices.contains_key(&column)
    }

    /// Fail the whole upload when a required column is absent
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        let missing: Vec<&str> = columns
            .iter()
            .filter(|c| !self.contains(**c))
            .map(|c| c.label())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LeagueError::invalid_upload(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            ))
            .into())
        }
    }

    /// Non-empty cell for `column`
    pub fn value<'r>(&self, row: &'r CsvRow, column: Column) -> Option<&'r str> {
        let index = *self.indices.get(&column)?;
        let cell = row.get(index);
        (!cell.is_empty()).then_some(cell)
    }
}

/// Typed records from one CSV plus the rows that failed validation
#[derive(Debug, Clone)]
pub struct ParsedUpload<T> {
    pub records: Vec<T>,
    /// One message per rejected row, prefixed with its line number
    pub errors: Vec<String>,
}

impl<T> Default for ParsedUpload<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Parse a scores CSV into game results.
///
/// Every column is required. Rows with blank fields, non-integer or negative
/// scores, unreadable dates, or a team playing itself are rejected.
pub fn parse_scores(content: &str) -> Result<ParsedUpload<GameResult>> {
    let table = read_table(content)?;
    map_rows(
        &table,
        &[
            Column::GameId,
            Column::Date,
            Column::Team1,
            Column::Team2,
            Column::Score1,
            Column::Score2,
        ],
        |map, row| score_from_row(map, row).map(Some),
    )
}

/// Parse a schedule CSV into schedule entries.
///
/// Game id is optional; playoff placeholder rows are scheduled without one.
/// Rows naming `"No Game"` as a team are dropped silently.
pub fn parse_schedule(content: &str) -> Result<ParsedUpload<ScheduleEntry>> {
    let table = read_table(content)?;
    map_rows(
        &table,
        &[Column::Date, Column::Team1, Column::Team2, Column::Time],
        schedule_from_row,
    )
}

fn map_rows<T, F>(table: &CsvTable, required: &[Column], mut convert: F) -> Result<ParsedUpload<T>>
where
    F: FnMut(&ColumnMap, &CsvRow) -> std::result::Result<Option<T>, String>,
{
    if table.headers.is_empty() {
        return Ok(ParsedUpload::default());
    }

    let map = ColumnMap::resolve(&table.headers);
    map.require(required)?;

    let mut parsed = ParsedUpload::default();
    for row in &table.rows {
        match convert(&map, row) {
            Ok(Some(record)) => parsed.records.push(record),
            Ok(None) => {}
            Err(reason) => parsed.errors.push(format!("line {}: {}", row.line, reason)),
        }
    }
    Ok(parsed)
}

fn required<'r>(
    map: &ColumnMap,
    row: &'r CsvRow,
    column: Column,
) -> std::result::Result<&'r str, String> {
    map.value(row, column)
        .ok_or_else(|| format!("missing {}", column.label()))
}

fn score_from_row(map: &ColumnMap, row: &CsvRow) -> std::result::Result<GameResult, String> {
    let game_id = required(map, row, Column::GameId)?;
    let date_raw = required(map, row, Column::Date)?;
    let team_a = required(map, row, Column::Team1)?;
    let team_b = required(map, row, Column::Team2)?;
    let score_a = parse_score(required(map, row, Column::Score1)?, Column::Score1)?;
    let score_b = parse_score(required(map, row, Column::Score2)?, Column::Score2)?;

    if team_a == team_b {
        return Err(format!("team '{}' cannot play itself", team_a));
    }

    let date =
        parse_league_date(date_raw).ok_or_else(|| format!("unrecognised date '{}'", date_raw))?;

    Ok(GameResult::new(game_id, date, team_a, team_b, score_a, score_b))
}

fn schedule_from_row(
    map: &ColumnMap,
    row: &CsvRow,
) -> std::result::Result<Option<ScheduleEntry>, String> {
    // a bye may leave the other team cell blank
    let team1 = map.value(row, Column::Team1);
    let team2 = map.value(row, Column::Team2);
    if team1 == Some(NO_GAME) || team2 == Some(NO_GAME) {
        return Ok(None);
    }
    let team1 = team1.ok_or_else(|| format!("missing {}", Column::Team1.label()))?;
    let team2 = team2.ok_or_else(|| format!("missing {}", Column::Team2.label()))?;

    let date_raw = required(map, row, Column::Date)?;
    let time_raw = required(map, row, Column::Time)?;
    let date =
        parse_league_date(date_raw).ok_or_else(|| format!("unrecognised date '{}'", date_raw))?;
    let time =
        parse_league_time(time_raw).ok_or_else(|| format!("unrecognised time '{}'", time_raw))?;

    Ok(Some(ScheduleEntry {
        game_id: map.value(row, Column::GameId).map(str::to_string),
        date,
        time,
        team1: team1.to_string(),
        team2: team2.to_string(),
        is_playoff: is_playoff_matchup(team1, team2),
    }))
}

fn parse_score(raw: &str, column: Column) -> std::result::Result<i64, String> {
    let score: i64 = raw
        .parse()
        .map_err(|_| format!("{} '{}' is not a whole number", column.label(), raw))?;
    if score < 0 {
        return Err(format!("{} cannot be negative", column.label()));
    }
    Ok(score)
}

/// Parse `M/D/YY`, `M/D/YYYY` or ISO `YYYY-MM-DD`; two-digit years are 20YY
pub fn parse_league_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = raw.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    let year_digits = year.trim();
    let mut year: i32 = year_digits.parse().ok()?;
    if year_digits.len() <= 2 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `H:MM`; hours in the evening window written as 12h gain 12
pub fn parse_league_time(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let mut hour: u32 = hours.trim().parse().ok()?;
    let minute: u32 = minutes.trim().parse().ok()?;

    if (EVENING_START_HOUR..12).contains(&hour) {
        hour += 12;
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Whether either side is a bracket slot rather than a real team
pub fn is_playoff_matchup(team1: &str, team2: &str) -> bool {
    PLAYOFF_MARKERS
        .iter()
        .any(|marker| team1.contains(marker) || team2.contains(marker))
}
