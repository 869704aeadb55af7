//! # API Response Types
//!
//! This module defines the JSON structures for the HTTP status API.

use crate::coordinator::{AssetView, Status};
use gather_core::{AmbientTrack, AssetState};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Aggregate preload status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub progress: u8,
    pub phase: String,
    pub settled: usize,
    pub total: usize,
    pub pending: usize,
    /// Set once ready: `all_settled`, `global_timeout` or `nothing_to_load`.
    pub cause: Option<String>,
    pub degraded: bool,
    pub closed: bool,
    pub elapsed_ms: Option<u64>,
}

impl From<Status> for StatusResponse {
    fn from(status: Status) -> Self {
        let snapshot = status.snapshot;
        Self {
            progress: snapshot.progress,
            phase: snapshot.phase.name().to_string(),
            settled: snapshot.settled,
            total: snapshot.total,
            pending: snapshot.pending(),
            cause: snapshot.cause.map(|c| c.name().to_string()),
            degraded: snapshot.cause.is_some_and(|c| c.is_degraded()),
            closed: snapshot.closed,
            elapsed_ms: status.report.map(|r| r.elapsed_ms),
        }
    }
}

// =============================================================================
// ASSETS RESPONSE
// =============================================================================

/// One asset in the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetJson {
    pub id: usize,
    pub locator: Option<String>,
    pub kind: Option<String>,
    /// `pending` or `settled`.
    pub state: String,
    /// `success`, `failure` or `timed_out` once settled.
    pub outcome: Option<String>,
    pub error: Option<String>,
}

impl From<AssetView> for AssetJson {
    fn from(view: AssetView) -> Self {
        let (state, outcome) = match view.state {
            AssetState::Pending => ("pending", None),
            AssetState::Settled(outcome) => ("settled", Some(outcome.name().to_string())),
        };
        Self {
            id: view.id.index(),
            locator: view.locator,
            kind: view.kind.map(|k| k.name().to_string()),
            state: state.to_string(),
            outcome,
            error: view.error,
        }
    }
}

/// Per-asset listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsResponse {
    pub assets: Vec<AssetJson>,
}

// =============================================================================
// READY RESPONSE
// =============================================================================

/// Readiness probe body; served with 200 when ready, 503 otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub progress: u8,
    pub cause: Option<String>,
}

impl From<Status> for ReadyResponse {
    fn from(status: Status) -> Self {
        Self {
            ready: status.is_ready(),
            progress: status.progress(),
            cause: status.report.map(|r| r.cause.name().to_string()),
        }
    }
}

// =============================================================================
// AMBIENT RESPONSE
// =============================================================================

/// Ambient track state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientResponse {
    pub configured: bool,
    pub locator: Option<String>,
    /// `idle`, `playing` or `stopped`; `none` without a track.
    pub state: String,
    pub looping: bool,
    pub volume_percent: u8,
}

impl From<Option<&AmbientTrack>> for AmbientResponse {
    fn from(track: Option<&AmbientTrack>) -> Self {
        match track {
            Some(track) => Self {
                configured: true,
                locator: Some(track.locator.clone()),
                state: track.state().name().to_string(),
                looping: track.looping,
                volume_percent: track.volume_percent,
            },
            None => Self {
                configured: false,
                locator: None,
                state: "none".to_string(),
                looping: false,
                volume_percent: 0,
            },
        }
    }
}
