//! HTTP server lifecycle
//!
//! Binds the router to a TCP listener and serves until the stop flag is set.

use super::{router, HttpState};
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

pub struct HttpServer {
    config: HttpServerConfig,
    state: HttpState,
    shutdown_tx: watch::Sender<bool>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: HttpState) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Configured socket address
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")
    }

    /// Bind a listener on `addr`
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Bind the configured address and serve until stopped
    pub async fn start(&self) -> Result<()> {
        let listener = Self::bind(self.addr()?).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until stopped
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                // a stop before subscribing is still seen
                let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Signal the server to finish in-flight requests and stop
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping HTTP server...");

        if self.shutdown_tx.send_replace(true) {
            warn!("HTTP server was already stopped");
        }

        Ok(())
    }
}
