//! # Gather HTTP API Module
//!
//! A read-only status API over one preload batch, using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Aggregate progress, phase and ready cause
//! - `GET /assets` - Per-asset states
//! - `GET /ready` - 200 once ready, 503 while loading
//! - `GET /ambient` - Ambient track state
//!
//! ## Configuration (Environment Variables)
//!
//! - `GATHER_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

pub use handlers::{
    ambient_handler, assets_handler, health_handler, ready_handler, status_handler,
};
pub use types::{
    AmbientResponse, AssetJson, AssetsResponse, HealthResponse, ReadyResponse, StatusResponse,
};

use crate::config::CORS_ORIGINS_ENV;
use crate::coordinator::Coordinator;
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use gather_core::{AmbientTrack, GatherError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the batch being preloaded and its ambient track.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub ambient: Arc<RwLock<Option<AmbientTrack>>>,
}

impl AppState {
    #[must_use]
    pub fn new(coordinator: Coordinator, ambient: Option<AmbientTrack>) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            ambient: Arc::new(RwLock::new(ambient)),
        }
    }

    /// Start the ambient track once the batch is ready.
    ///
    /// Does nothing if the batch is torn down first or there is no track.
    pub fn start_ambient_when_ready(&self) -> JoinHandle<()> {
        let listener = self.coordinator.on_ready();
        let ambient = Arc::clone(&self.ambient);

        tokio::spawn(async move {
            if listener.wait().await.is_none() {
                return;
            }
            let mut track = ambient.write().await;
            if let Some(track) = track.as_mut()
                && track.start()
            {
                tracing::info!(
                    locator = %track.locator,
                    volume_percent = track.volume_percent,
                    looping = track.looping,
                    "Ambient track started"
                );
            }
        })
    }

    /// Stop the ambient track. Returns true if it was playing.
    pub async fn stop_ambient(&self) -> bool {
        let mut track = self.ambient.write().await;
        let Some(track) = track.as_mut() else {
            return false;
        };
        let stopped = track.stop();
        if stopped {
            tracing::info!(locator = %track.locator, "Ambient track stopped");
        }
        stopped
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Origins allowed when `GATHER_CORS_ORIGINS` is unset.
const LOCALHOST_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Build the CORS layer for the read-only API.
///
/// `GATHER_CORS_ORIGINS` is "*" for any origin or a comma-separated list;
/// unset means localhost only.
fn build_cors_layer() -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);

    match std::env::var(CORS_ORIGINS_ENV).ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins ({}=*)", CORS_ORIGINS_ENV);
            layer.allow_origin(Any)
        }
        Some(origins) => layer.allow_origin(parse_origins(origins)),
        None => layer.allow_origin(parse_origins(LOCALHOST_ORIGINS)),
    }
}

/// Parse a comma-separated origin list, skipping blank and invalid entries.
fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/assets", get(handlers::assets_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/ambient", get(handlers::ambient_handler))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the status API until Ctrl-C, then tear the batch down.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), GatherError> {
    let ambient = state.start_ambient_when_ready();
    let router = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatherError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Gather status API listening on {}", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GatherError::IoError(format!("Server error: {}", e)));

    state.coordinator.shutdown();
    ambient.abort();
    state.stop_ambient().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
