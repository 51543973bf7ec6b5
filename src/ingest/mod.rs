//! CSV ingestion boundary
//!
//! Everything that reaches the standings aggregator or the stores has passed
//! through here as a typed record.

pub mod schema;
pub mod table;

pub use schema::{
    is_playoff_matchup, parse_league_date, parse_league_time, parse_schedule, parse_scores,
    Column, ColumnMap, ParsedUpload,
};
pub use table::{read_table, CsvRow, CsvTable};
