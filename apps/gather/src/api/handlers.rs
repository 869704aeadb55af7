//! # API Endpoint Handlers
//!
//! This module implements the HTTP endpoint handlers. Every handler only
//! reads: the coordinator and the ambient track are driven elsewhere.

use super::{
    AppState,
    types::{
        AmbientResponse, AssetJson, AssetsResponse, HealthResponse, ReadyResponse, StatusResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Aggregate progress and phase.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = StatusResponse::from(state.coordinator.status());
    (StatusCode::OK, Json(response))
}

// =============================================================================
// ASSETS HANDLER
// =============================================================================

/// Per-asset states in batch order.
pub async fn assets_handler(State(state): State<AppState>) -> impl IntoResponse {
    let assets = state
        .coordinator
        .assets()
        .into_iter()
        .map(AssetJson::from)
        .collect();

    (StatusCode::OK, Json(AssetsResponse { assets }))
}

// =============================================================================
// READY HANDLER
// =============================================================================

/// Readiness probe: 200 once ready, 503 while loading.
pub async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.coordinator.status();
    let code = if status.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(ReadyResponse::from(status)))
}

// =============================================================================
// AMBIENT HANDLER
// =============================================================================

/// Ambient track state.
pub async fn ambient_handler(State(state): State<AppState>) -> impl IntoResponse {
    let track = state.ambient.read().await;
    (StatusCode::OK, Json(AmbientResponse::from(track.as_ref())))
}
