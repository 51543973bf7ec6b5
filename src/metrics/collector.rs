//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the league service using
//! Prometheus metrics.

use crate::types::UploadKind;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the league service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Upload, standings and recap metrics
    league_metrics: LeagueMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// HTTP requests by matched route and status code
    pub http_requests_total: IntCounterVec,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// League data metrics
#[derive(Clone)]
pub struct LeagueMetrics {
    /// Uploads by kind and outcome
    pub uploads_total: IntCounterVec,

    /// Rows dropped during ingestion
    pub rows_rejected_total: IntCounterVec,

    /// Records held by the store after the last upload
    pub records_stored: IntGaugeVec,

    /// Standings tables computed
    pub standings_computed_total: IntCounter,

    /// Teams in the last computed table
    pub teams_ranked: IntGauge,

    /// Recap saves and deletes
    pub recap_operations_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Standings aggregation time
    pub standings_duration: Histogram,

    /// Store operation durations
    pub storage_operation_duration: HistogramVec,

    /// HTTP request durations
    pub http_request_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let league_metrics = LeagueMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            league_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn league(&self) -> &LeagueMetrics {
        &self.league_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record an accepted upload
    pub fn record_upload(&self, kind: UploadKind, rejected_rows: usize, stored_total: usize) {
        self.league_metrics
            .uploads_total
            .with_label_values(&[kind.as_str(), "accepted"])
            .inc();

        self.league_metrics
            .rows_rejected_total
            .with_label_values(&[kind.as_str()])
            .inc_by(rejected_rows as u64);

        self.league_metrics
            .records_stored
            .with_label_values(&[kind.as_str()])
            .set(stored_total as i64);
    }

    /// Record an upload that was refused as a whole
    pub fn record_upload_rejected(&self, kind: UploadKind, rejected_rows: usize) {
        self.league_metrics
            .uploads_total
            .with_label_values(&[kind.as_str(), "rejected"])
            .inc();

        self.league_metrics
            .rows_rejected_total
            .with_label_values(&[kind.as_str()])
            .inc_by(rejected_rows as u64);
    }

    /// Record one standings computation
    pub fn record_standings(&self, teams: usize, duration: Duration) {
        self.league_metrics.standings_computed_total.inc();
        self.league_metrics.teams_ranked.set(teams as i64);
        self.performance_metrics
            .standings_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_recap_operation(&self, operation: &str) {
        self.league_metrics
            .recap_operations_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Record store operation duration
    pub fn record_storage_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .storage_operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record a served HTTP request
    pub fn record_http_request(&self, route: &str, status: u16, duration: Duration) {
        let status = status.to_string();
        self.service_metrics
            .http_requests_total
            .with_label_values(&[route, status.as_str()])
            .inc();

        self.performance_metrics
            .http_request_duration
            .with_label_values(&[route])
            .observe(duration.as_secs_f64());
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Encode every registered metric in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        TextEncoder::new()
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }

    /// Content type of [`Self::gather_text`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("rec_league_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("rec_league_http_requests_total", "Total HTTP requests served"),
            &["route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let health_status = IntGauge::new(
            "rec_league_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("rec_league_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            http_requests_total,
            health_status,
            component_health,
        })
    }
}

impl LeagueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uploads_total = IntCounterVec::new(
            Opts::new("rec_league_uploads_total", "CSV uploads by kind and outcome"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(uploads_total.clone()))?;

        let rows_rejected_total = IntCounterVec::new(
            Opts::new(
                "rec_league_rows_rejected_total",
                "Uploaded rows dropped during validation",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(rows_rejected_total.clone()))?;

        let records_stored = IntGaugeVec::new(
            Opts::new("rec_league_records_stored", "Records held by the store"),
            &["kind"],
        )?;
        registry.register(Box::new(records_stored.clone()))?;

        let standings_computed_total = IntCounter::new(
            "rec_league_standings_computed_total",
            "Standings tables computed",
        )?;
        registry.register(Box::new(standings_computed_total.clone()))?;

        let teams_ranked = IntGauge::new(
            "rec_league_teams_ranked",
            "Teams in the last computed standings table",
        )?;
        registry.register(Box::new(teams_ranked.clone()))?;

        let recap_operations_total = IntCounterVec::new(
            Opts::new("rec_league_recap_operations_total", "Recap saves and deletes"),
            &["operation"],
        )?;
        registry.register(Box::new(recap_operations_total.clone()))?;

        Ok(Self {
            uploads_total,
            rows_rejected_total,
            records_stored,
            standings_computed_total,
            teams_ranked,
            recap_operations_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let standings_duration = Histogram::with_opts(
            HistogramOpts::new(
                "rec_league_standings_duration_seconds",
                "Standings aggregation time",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(standings_duration.clone()))?;

        let storage_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "rec_league_storage_operation_duration_seconds",
                "Store operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(storage_operation_duration.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "rec_league_http_request_duration_seconds",
                "HTTP request duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            standings_duration,
            storage_operation_duration,
            http_request_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _service = collector.service();
        let _league = collector.league();
        let _performance = collector.performance();
    }

    #[test]
    fn test_upload_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_upload(UploadKind::Scores, 2, 14);
        collector.record_upload_rejected(UploadKind::Schedule, 3);

        let league = collector.league();
        assert_eq!(
            league
                .uploads_total
                .with_label_values(&["scores", "accepted"])
                .get(),
            1
        );
        assert_eq!(
            league
                .uploads_total
                .with_label_values(&["schedule", "rejected"])
                .get(),
            1
        );
        assert_eq!(
            league.rows_rejected_total.with_label_values(&["scores"]).get(),
            2
        );
        assert_eq!(league.records_stored.with_label_values(&["scores"]).get(), 14);
    }

    #[test]
    fn test_standings_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_standings(8, Duration::from_micros(40));
        collector.record_standings(9, Duration::from_micros(35));

        assert_eq!(collector.league().standings_computed_total.get(), 2);
        assert_eq!(collector.league().teams_ranked.get(), 9);
        assert_eq!(
            collector.performance().standings_duration.get_sample_count(),
            2
        );
    }

    #[test]
    fn test_health_status_updates() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.update_health_status(2);
        collector.update_component_health("storage", true);
        collector.update_component_health("http", false);

        assert_eq!(collector.service().health_status.get(), 2);
        assert_eq!(
            collector
                .service()
                .component_health
                .with_label_values(&["http"])
                .get(),
            0
        );
    }

    #[test]
    fn test_gather_text_includes_prefix() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        collector.record_http_request("/api/standings", 200, Duration::from_millis(3));

        let text = collector.gather_text().unwrap();
        assert!(text.contains("rec_league_http_requests_total"));
        assert!(collector.content_type().contains("text/plain"));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
