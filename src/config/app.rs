//! Main application configuration
//!
//! This module defines the primary configuration structures for the league
//! service, including environment variable and TOML file loading and
//! validation.

use crate::error::LeagueError;
use crate::schedule::DEFAULT_VENUE;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub admin: AdminSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Address the HTTP server binds to
    pub http_host: String,
    /// Port for the API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// How often the health gauges are refreshed
    pub health_interval_seconds: u64,
}

/// Where league data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// CSV files in `data_dir`
    Csv,
    /// Process memory; nothing survives a restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(StorageBackend::Csv),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(LeagueError::ConfigurationError {
                message: format!("Unknown storage backend: {}", other),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Csv => write!(f, "csv"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// League data settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Directory holding schedule.csv, scores.csv and recaps.csv
    pub data_dir: PathBuf,
    /// Venue shown on every scheduled game
    pub venue: String,
    /// Refuse scores whose game id is not in the schedule
    pub require_scheduled_games: bool,
}

/// Admin surface settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Bearer token for admin routes; admin routes are disabled when unset
    pub token: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rec-league".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
            health_interval_seconds: 60,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Csv,
            data_dir: PathBuf::from("data"),
            venue: DEFAULT_VENUE.to_string(),
            require_scheduled_games: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load a TOML file, then let environment variables override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            self.storage.backend = backend
                .parse()
                .map_err(|_| anyhow!("Invalid STORAGE_BACKEND value: {}", backend))?;
        }
        if let Ok(dir) = env::var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(venue) = env::var("VENUE") {
            self.storage.venue = venue;
        }
        if let Ok(require) = env::var("REQUIRE_SCHEDULED_GAMES") {
            self.storage.require_scheduled_games = require
                .parse()
                .map_err(|_| anyhow!("Invalid REQUIRE_SCHEDULED_GAMES value: {}", require))?;
        }

        // Admin settings
        if let Ok(token) = env::var("ADMIN_TOKEN") {
            self.admin.token = Some(token).filter(|t| !t.is_empty());
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get health refresh interval as Duration
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.service.health_interval_seconds)
    }

    /// Socket address string for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.service.http_host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate ports
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.health_interval_seconds == 0 {
        return Err(anyhow!("Health interval must be greater than 0"));
    }

    // Validate storage settings
    if config.storage.backend == StorageBackend::Csv
        && config.storage.data_dir.as_os_str().is_empty()
    {
        return Err(anyhow!("Data directory cannot be empty for the csv backend"));
    }
    if config.storage.venue.trim().is_empty() {
        return Err(anyhow!("Venue cannot be empty"));
    }

    if let Some(token) = &config.admin.token {
        if token.trim().is_empty() {
            return Err(anyhow!("Admin token cannot be blank"));
        }
    }

    Ok(())
}
