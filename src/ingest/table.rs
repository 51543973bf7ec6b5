//! Raw CSV tables: a header row plus string cells
//!
//! No typing happens here; [`super::schema`] maps columns onto records.

use crate::error::{LeagueError, Result};
use csv::{ReaderBuilder, Trim};

/// Cell value spreadsheets emit for an empty slot in the schedule
pub const NO_GAME: &str = "No Game";

/// One data row, cells in header order
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// 1-based line number in the source text
    pub line: u64,
    cells: Vec<String>,
}

impl CsvRow {
    /// Cell at `index`, or "" for a short row
    pub fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    fn has_data(&self) -> bool {
        self.cells
            .iter()
            .any(|cell| !cell.is_empty() && cell != NO_GAME)
    }
}

/// Header row plus every row that carries data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read `content` as a headed CSV table.
///
/// Cells are trimmed and rows may be ragged. Rows whose cells are all blank or
/// `"No Game"` are dropped.
pub fn read_table(content: &str) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LeagueError::invalid_upload(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| LeagueError::invalid_upload(format!("Malformed CSV: {}", e)))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = CsvRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        };
        if row.has_data() {
            rows.push(row);
        }
    }

    Ok(CsvTable { headers, rows })
}
