//! encounterd - tabletop encounter session daemon
//!
//! A session engine for turn-based tabletop combat: dice rolls, initiative
//! order, hit points, timed status effects, an in-game calendar, and
//! snapshot/restore, driven over a small HTTP API.

pub mod api;
pub mod config;
pub mod engine;
pub mod store;

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use config::Config;

/// The encounterd server instance
pub struct Server {
    config: Config,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self { config, shutdown_tx, shutdown_rx }
    }

    /// Build the router
    fn router(&self) -> Router {
        api::router(&self.config)
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("encounterd listening on {}", local_addr);

        let router = self.router();
        let mut shutdown_rx = self.shutdown_rx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await?;

        info!("encounterd shutdown complete");
        Ok(())
    }

    /// Signal the server to shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
