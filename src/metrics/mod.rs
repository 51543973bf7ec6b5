//! Metrics and monitoring for the league service
//!
//! Prometheus counters, gauges and histograms for uploads, standings and HTTP
//! traffic. The `/metrics` route renders the registry in text format.

pub mod collector;

pub use collector::{
    LeagueMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, ServiceMetrics,
};
