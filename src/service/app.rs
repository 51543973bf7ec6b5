//! Main application state and service coordination
//!
//! This module contains the AppState that wires the store, league service,
//! metrics and HTTP server together and owns the background tasks.

use crate::config::{AppConfig, StorageBackend};
use crate::http::{HttpServer, HttpServerConfig, HttpState};
use crate::metrics::MetricsCollector;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::service::league::LeagueService;
use crate::storage::{CsvLeagueStore, InMemoryLeagueStore, LeagueStore};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// League operations over the configured store
    league: Arc<LeagueService>,

    metrics: Arc<MetricsCollector>,

    http_server: Arc<HttpServer>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    /// Wakes background tasks on shutdown
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing {} service", config.service.name);
        info!(
            "Configuration: storage={}, data_dir={}, http={}",
            config.storage.backend,
            config.storage.data_dir.display(),
            config.http_addr()
        );

        let metrics =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let store = Self::initialize_store(&config).await?;
        let league = Arc::new(LeagueService::new(
            store,
            metrics.clone(),
            config.storage.venue.clone(),
            config.storage.require_scheduled_games,
        ));

        if config.admin.token.is_none() {
            warn!("No admin token configured; admin routes are disabled");
        }

        let is_running = Arc::new(RwLock::new(false));
        let http_state = HttpState {
            league: league.clone(),
            metrics: metrics.clone(),
            admin_token: config.admin.token.clone(),
            service_name: config.service.name.clone(),
            is_running: is_running.clone(),
        };
        let http_server = Arc::new(HttpServer::new(
            HttpServerConfig {
                host: config.service.http_host.clone(),
                port: config.service.http_port,
            },
            http_state,
        ));

        Ok(Self {
            config,
            league,
            metrics,
            http_server,
            background_tasks: Vec::new(),
            is_running,
            shutdown_tx: broadcast::channel(1).0,
        })
    }

    /// Build the configured store and make sure it is reachable
    async fn initialize_store(config: &AppConfig) -> Result<Arc<dyn LeagueStore>, ServiceError> {
        let store: Arc<dyn LeagueStore> = match config.storage.backend {
            StorageBackend::Csv => {
                info!(
                    "Using CSV storage in {}",
                    config.storage.data_dir.display()
                );
                Arc::new(CsvLeagueStore::new(config.storage.data_dir.clone()))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; uploads will not survive a restart");
                Arc::new(InMemoryLeagueStore::new())
            }
        };

        store.ping().await.map_err(|e| ServiceError::Storage {
            message: format!("Storage backend {} unavailable: {}", store.backend_name(), e),
        })?;

        Ok(store)
    }

    /// Start the HTTP server and background tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting {} service", self.config.service.name);

        *self.is_running.write().await = true;

        if let Err(e) = self.start_http_server().await {
            *self.is_running.write().await = false;
            return Err(e);
        }
        self.start_background_tasks();

        info!("✅ {} service started successfully", self.config.service.name);
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);

        *self.is_running.write().await = false;
        // no receivers means no background tasks were started
        let _ = self.shutdown_tx.send(());

        if let Err(e) = self.http_server.stop().await {
            warn!("Failed to stop HTTP server: {}", e);
        }

        self.stop_background_tasks().await;

        match self.league.counts().await {
            Ok(counts) => info!("Final league data: {:?}", counts),
            Err(e) => {
                return Err(ServiceError::BackgroundTask {
                    message: format!("Failed to read final counts: {}", e),
                })
            }
        }

        info!("✅ {} shutdown completed", self.config.service.name);
        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn league(&self) -> Arc<LeagueService> {
        self.league.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn http_server(&self) -> Arc<HttpServer> {
        self.http_server.clone()
    }

    async fn start_http_server(&mut self) -> Result<(), ServiceError> {
        info!("Starting HTTP server on {}", self.config.http_addr());

        let addr = self
            .http_server
            .addr()
            .map_err(|e| ServiceError::Configuration {
                message: format!("{:#}", e),
            })?;
        let listener =
            HttpServer::bind(addr)
                .await
                .map_err(|e| ServiceError::Initialization {
                    message: format!("{:#}", e),
                })?;

        let server = self.http_server.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                error!("HTTP server failed: {}", e);
            } else {
                info!("HTTP server task completed");
            }
        });
        self.background_tasks.push(handle);

        Ok(())
    }

    /// Start background maintenance tasks
    fn start_background_tasks(&mut self) {
        let interval_duration = self.config.health_interval();
        info!(
            "Starting health metrics task ({}s interval)...",
            interval_duration.as_secs()
        );

        let health_metrics_task = {
            let league = self.league.clone();
            let metrics = self.metrics.clone();
            let is_running = self.is_running.clone();
            let service_name = self.config.service.name.clone();
            let mut shutdown_rx = self.shutdown_tx.subscribe();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(interval_duration);
                let start_time = tokio::time::Instant::now();
                info!("Health metrics task started");

                while *is_running.read().await {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = shutdown_rx.recv() => break,
                    }

                    let uptime_seconds = start_time.elapsed().as_secs() as i64;
                    metrics.service().uptime_seconds.set(uptime_seconds);

                    let running = *is_running.read().await;
                    match HealthCheck::check(&league, running, &service_name).await {
                        Ok(health) => {
                            metrics.update_health_status(health.status.as_gauge());
                            for check in &health.checks {
                                metrics.update_component_health(
                                    &check.name,
                                    check.status == HealthStatus::Healthy,
                                );
                            }
                            debug!(
                                "Health: {} - {} games scheduled, {} scores, uptime {}s",
                                health.status,
                                health.stats.counts.scheduled_games,
                                health.stats.counts.scores,
                                uptime_seconds
                            );
                        }
                        Err(e) => warn!("Health check failed: {}", e),
                    }
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.push(health_metrics_task);
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Waiting for {} background tasks to stop...", task_count);

        let shutdown_timeout = self.config.shutdown_timeout();
        for (i, mut task) in self.background_tasks.drain(..).enumerate() {
            match tokio::time::timeout(shutdown_timeout, &mut task).await {
                Ok(_) => debug!("Background task {}/{} finished", i + 1, task_count),
                Err(_) => {
                    warn!(
                        "Background task {}/{} did not stop in time, aborting",
                        i + 1,
                        task_count
                    );
                    task.abort();
                }
            }
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}
