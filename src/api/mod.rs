//! HTTP API module - REST endpoints for the session engine

mod dice;
mod session;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::engine::Session;
use crate::store::FileSnapshotStore;

/// Shared application state
///
/// The engine has no internal locking; every command goes through this one
/// lock, write-held for the whole mutation, so commands stay atomic.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub store: Arc<FileSnapshotStore>,
}

/// Build the API router
pub fn router(config: &Config) -> Router {
    let state = AppState {
        session: Arc::new(RwLock::new(Session::new())),
        store: Arc::new(FileSnapshotStore::new(config.data_dir.clone())),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(dice::router())
        .merge(session::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "encounterd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(HealthResponse {
        status: "healthy",
        combatants: session.initiative.len(),
        combat_round: session.initiative.round(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    combatants: usize,
    combat_round: u32,
}
