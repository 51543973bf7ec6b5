//! Rec League - standings, schedules and recaps for a recreational league
//!
//! This crate ingests schedule and score spreadsheets exported as CSV,
//! ranks teams from the recorded results, and serves the league over HTTP.

pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod metrics;
pub mod schedule;
pub mod service;
pub mod standings;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LeagueError, Result};
pub use types::*;

// Re-export key components
pub use service::{LeagueService, standings_from};
pub use standings::{compute_standings, scores_stats};
pub use storage::{CsvLeagueStore, InMemoryLeagueStore, LeagueStore, ResultsProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
