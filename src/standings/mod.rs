//! Standings computation
//!
//! Pure functions over game results: no I/O, no shared state, safe to call
//! from any number of requests at once.

pub mod aggregator;
pub mod stats;

pub use aggregator::{compute_standings, rank_order};
pub use stats::scores_stats;
