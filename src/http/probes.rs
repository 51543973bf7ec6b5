//! Health check endpoints and Prometheus metrics
//!
//! Liveness, readiness and a detailed stats view for operators, plus the
//! registry rendered for Prometheus scraping.

use super::HttpState;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::utils;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

/// Root endpoint handler - shows service information
pub async fn root_handler(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/schedule",
            "/api/teams",
            "/api/scores",
            "/api/scores/stats",
            "/api/standings",
            "/api/recaps",
            "/api/recaps/{game_id}",
            "/api/admin/schedule",
            "/api/admin/scores",
            "/api/admin/recaps",
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats"
        ]
    }))
}

/// Lightweight health check endpoint handler
pub async fn health_handler(State(state): State<HttpState>) -> impl IntoResponse {
    debug!("Health check requested");

    let status = HealthCheck::liveness_check(state.is_running().await);
    let code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": state.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint handler
pub async fn ready_handler(State(state): State<HttpState>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(&state.league, state.is_running().await).await {
        HealthStatus::Healthy => (StatusCode::OK, "Ready"),
        HealthStatus::Degraded => (StatusCode::OK, "Degraded but ready"),
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
    }
}

/// Liveness check endpoint handler
pub async fn alive_handler(State(state): State<HttpState>) -> impl IntoResponse {
    match HealthCheck::liveness_check(state.is_running().await) {
        HealthStatus::Healthy => (StatusCode::OK, "Alive"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<HttpState>) -> Response {
    match state.metrics.gather_text() {
        Ok(metrics_output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.metrics.content_type())],
            metrics_output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Detailed service statistics endpoint handler (for debugging/human consumption)
pub async fn stats_handler(State(state): State<HttpState>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    match HealthCheck::check(&state.league, state.is_running().await, &state.service_name).await {
        Ok(health) => {
            let stats = json!({
                "service": {
                    "name": state.service_name,
                    "version": env!("CARGO_PKG_VERSION"),
                    "status": health.status,
                },
                "league": health.stats,
                "components": health.checks,
                "timestamp": utils::current_timestamp()
            });

            (StatusCode::OK, Json(stats))
        }
        Err(e) => {
            error!("Failed to get stats: {}", e);

            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "service": {
                        "name": state.service_name,
                        "version": env!("CARGO_PKG_VERSION"),
                        "status": "error"
                    },
                    "error": "Failed to get service stats",
                    "timestamp": utils::current_timestamp()
                })),
            )
        }
    }
}
