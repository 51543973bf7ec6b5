//! Main entry point for the rec-league service
//!
//! This is the production entry point that loads configuration, initializes
//! logging, and runs the league HTTP service until a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use rec_league::config::{validate_config, AppConfig, StorageBackend};
use rec_league::service::{AppState, HealthCheck, HealthStatus};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Rec League Service - standings, schedules and recaps for a recreational league
#[derive(Parser)]
#[command(
    name = "rec-league",
    version,
    about = "League standings, schedule and recap service",
    long_about = "Rec League ingests schedule and score spreadsheets exported as CSV, ranks teams \
                 by wins and average point differential, and serves the schedule, standings and \
                 game recaps over a JSON HTTP API with token-guarded admin uploads."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Data directory override
    #[arg(long, value_name = "DIR", help = "Override the CSV data directory")]
    data_dir: Option<PathBuf>,

    /// Storage backend override
    #[arg(long, value_name = "BACKEND", help = "Override storage backend (csv, memory)")]
    storage: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    let app_state = AppState::new(config.clone()).await?;
    let league = app_state.league();

    match HealthCheck::check(&league, true, &config.service.name).await {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Storage: {}", health.stats.storage_backend);
            println!("  Scheduled Games: {}", health.stats.counts.scheduled_games);
            println!("  Scores: {}", health.stats.counts.scores);
            println!("  Recaps: {}", health.stats.counts.recaps);
            println!("  Teams: {}", health.stats.counts.teams);

            if health.status == HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🏀 Rec League Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP: {}", config.http_addr());
    info!("   Storage: {}", config.storage.backend);
    if config.storage.backend == StorageBackend::Csv {
        info!("   Data dir: {}", config.storage.data_dir.display());
    }
    info!("   Venue: {}", config.storage.venue);
    info!(
        "   Admin routes: {}",
        if config.admin.token.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    if let Some(storage) = &args.storage {
        config.storage.backend = storage.parse()?;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Some(config_path) = &args.config {
        info!("Loaded configuration from: {}", config_path.display());
    }

    // Handle special modes
    if args.health_check {
        return perform_health_check(config).await;
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let mut app_state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    info!("✅ Rec League Service is running on http://{}", config.http_addr());
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    let shutdown_timeout = config.shutdown_timeout();
    match tokio::time::timeout(shutdown_timeout, app_state.shutdown()).await {
        Ok(Ok(())) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Ok(Err(e)) => {
            warn!("Shutdown finished with errors: {}", e);
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Rec League Service stopped");
    Ok(())
}
