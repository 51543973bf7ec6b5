//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the league service,
//! including readiness and liveness probes.

use crate::service::league::{LeagueCounts, LeagueService};
use crate::storage::ResultsProvider;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value (0=unhealthy, 1=degraded, 2=healthy)
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub name: String,
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub storage_backend: String,
    #[serde(flatten)]
    pub counts: LeagueCounts,
}

impl HealthCheck {
    /// Perform a full health check of the service
    pub async fn check(league: &LeagueService, is_running: bool, service: &str) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        let service_check = Self::check_service_running(is_running);
        if service_check.status != HealthStatus::Healthy {
            overall_status = HealthStatus::Unhealthy;
        }
        checks.push(service_check);

        let storage_check = Self::check_storage(league).await;
        if storage_check.status == HealthStatus::Unhealthy {
            overall_status = HealthStatus::Unhealthy;
        } else if storage_check.status == HealthStatus::Degraded
            && overall_status == HealthStatus::Healthy
        {
            overall_status = HealthStatus::Degraded;
        }
        checks.push(storage_check);

        let stats = Self::gather_service_stats(league).await;

        Ok(HealthCheck {
            status: overall_status,
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: crate::utils::current_timestamp(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub fn liveness_check(is_running: bool) -> HealthStatus {
        if is_running {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// Readiness check - verify the store can serve requests
    pub async fn readiness_check(league: &LeagueService, is_running: bool) -> HealthStatus {
        if !is_running {
            return HealthStatus::Unhealthy;
        }

        Self::check_storage(league).await.status
    }

    fn check_service_running(is_running: bool) -> ComponentCheck {
        let (status, message) = if is_running {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: 0,
        }
    }

    /// Ping the store, then make sure the scores file actually parses
    async fn check_storage(league: &LeagueService) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match league.ping().await {
            Ok(()) => match league.store().list_results().await {
                Ok(_) => (HealthStatus::Healthy, None),
                Err(e) => {
                    warn!("Storage reachable but results unreadable: {}", e);
                    (
                        HealthStatus::Degraded,
                        Some(format!("Results unreadable: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Storage ping failed: {}", e);
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
        };

        ComponentCheck {
            name: format!("storage_{}", league.backend_name()),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn gather_service_stats(league: &LeagueService) -> ServiceStats {
        let counts = match league.counts().await {
            Ok(counts) => counts,
            Err(e) => {
                debug!("Failed to get league counts for health check: {}", e);
                LeagueCounts::default()
            }
        };

        ServiceStats {
            storage_backend: league.backend_name().to_string(),
            counts,
        }
    }
}

/// Convert health check to JSON string
impl HealthCheck {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
