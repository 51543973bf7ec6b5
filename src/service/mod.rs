//! Service layer for the rec-league service
//!
//! This module contains the league operations, health reporting, and the
//! application state that coordinates the running service.

pub mod app;
pub mod health;
pub mod league;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use league::{standings_from, LeagueCounts, LeagueService};
