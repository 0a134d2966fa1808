//! HTTP surface: router, shared state and request handlers.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::any;
use log::info;
use tokio::net::TcpListener;

use crate::asset::AssetStore;
use crate::provider::ReleaseSource;

pub use error::ServerError;

/// Immutable per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub releases: Arc<dyn ReleaseSource>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    pub fn new(releases: Arc<dyn ReleaseSource>, assets: Arc<dyn AssetStore>) -> Self {
        Self { releases, assets }
    }
}

/// Routes match on path only; every method reaches the handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::opentofu_install))
        .route("/install-opentofu", any(handlers::install_opentofu))
        .route("/install-opentofu.sh", any(handlers::install_opentofu))
        .route("/install-opentofu.ps1", any(handlers::install_opentofu))
        .route("/releases", any(handlers::release_list))
        .route("/releases/", any(handlers::release_list))
        .route("/releases/{release}", any(handlers::release_detail))
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
