//! Resolution Server
//!
//! Runs the REST server over the shared registry. The locator is scoped
//! to a single host's local clients: binding a non-loopback address is a
//! configuration error, not a warning.

use crate::error::{Error, Result};
use crate::registry::SharedRegistry;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{error, info};

use super::rest::RestRouter;

// =============================================================================
// Server Configuration
// =============================================================================

/// Fixed default endpoint known to all local clients
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4000";

/// Configuration for the resolution server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Bind address; must be loopback
    pub bind_addr: SocketAddr,
}

impl ApiServerConfig {
    /// Parse and validate a bind address
    pub fn from_addr(addr: &str) -> Result<Self> {
        let bind_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid bind address '{}': {}", addr, e)))?;

        if !bind_addr.ip().is_loopback() {
            return Err(Error::Configuration(format!(
                "Bind address {} is not loopback; the locator serves local clients only",
                bind_addr
            )));
        }

        Ok(Self { bind_addr })
    }
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// Resolution server serving REST queries over the registry
pub struct ApiServer {
    config: ApiServerConfig,
    registry: SharedRegistry,
    source: PathBuf,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new server over a registry and its CSV source
    pub fn new(config: ApiServerConfig, registry: SharedRegistry, source: PathBuf) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            registry,
            source,
            shutdown_tx,
        }
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let rest_handle = self.spawn_rest_server();

        tokio::select! {
            result = rest_handle => {
                match result {
                    Ok(inner) => inner?,
                    Err(e) => error!("REST server task error: {:?}", e),
                }
            }
        }

        Ok(())
    }

    /// Spawn the REST server task
    fn spawn_rest_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let addr = self.config.bind_addr;
        let registry = self.registry.clone();
        let source = self.source.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move { run_rest_server(addr, registry, source, shutdown_rx).await })
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Handle for wiring external shutdown triggers (e.g. ctrl-c)
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}

/// Run the REST server on the given loopback address
async fn run_rest_server(
    addr: SocketAddr,
    registry: SharedRegistry,
    source: PathBuf,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let router = RestRouter::new(registry, source);
    let app = router.build();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind resolution server: {}", e)))?;

    info!("Resolution server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Resolution server shutting down");
        })
        .await
        .map_err(|e| Error::Internal(format!("Resolution server error: {}", e)))?;

    Ok(())
}
