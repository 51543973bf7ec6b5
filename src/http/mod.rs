//! HTTP surface of the league service
//!
//! One axum router serves the public league API, the token-guarded admin
//! routes, and the health and metrics probes.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod probes;
pub mod server;

pub use auth::Admin;
pub use error::ApiError;
pub use server::{HttpServer, HttpServerConfig};

use crate::metrics::MetricsCollector;
use crate::service::league::LeagueService;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct HttpState {
    pub league: Arc<LeagueService>,
    pub metrics: Arc<MetricsCollector>,
    /// Admin routes answer 403 while this is unset
    pub admin_token: Option<String>,
    pub service_name: String,
    pub is_running: Arc<RwLock<bool>>,
}

impl HttpState {
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

/// Build the full router
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(probes::root_handler))
        // public league data
        .route("/api/schedule", get(handlers::schedule))
        .route("/api/teams", get(handlers::teams))
        .route("/api/scores", get(handlers::scores))
        .route("/api/scores/stats", get(handlers::scores_stats))
        .route("/api/standings", get(handlers::standings))
        .route("/api/recaps", get(handlers::recaps))
        .route("/api/recaps/{game_id}", get(handlers::recap))
        // admin
        .route("/api/admin/schedule", post(handlers::upload_schedule))
        .route("/api/admin/scores", post(handlers::upload_scores))
        .route("/api/admin/recaps", post(handlers::save_recap))
        .route("/api/admin/recaps/{game_id}", delete(handlers::delete_recap))
        // probes
        .route("/health", get(probes::health_handler))
        .route("/ready", get(probes::ready_handler))
        .route("/alive", get(probes::alive_handler))
        .route("/metrics", get(probes::metrics_handler))
        .route("/stats", get(probes::stats_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Count and time every routed request by its route template
async fn track_requests(State(state): State<HttpState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    state.metrics.record_http_request(&route, status, elapsed);
    debug!("{} {} -> {} in {:?}", method, route, status, elapsed);

    response
}
