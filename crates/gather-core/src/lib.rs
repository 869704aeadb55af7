//! # gather-core
//!
//! The deterministic readiness engine for Gather - THE LOGIC.
//!
//! This crate decides *what* a preload batch is and *when* it is ready. It
//! owns no clocks and no I/O: the runtime in `apps/gather` watches assets,
//! runs timers, and feeds every signal into the [`ReadinessLedger`].
//!
//! ## Lifecycle
//!
//! ```text
//!  raw locators ──► Classifier::plan ──► PlannedAsset (Watch | Malformed)
//!                                              │
//!        loader success / failure ─┐           ▼
//!        per-asset timeout ────────┼──► ReadinessLedger::settle ──► progress
//!        global timeout ───────────┼──► ReadinessLedger::force_ready ──┐
//!        grace delay ──────────────┘──► ReadinessLedger::complete_grace ┴─► Ready (once)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Never initiates work; only reacts to explicit signals
//! - Integer arithmetic only
//! - Asset failures are settlements, never errors of the batch

// =============================================================================
// MODULES
// =============================================================================

pub mod ambient;
pub mod classify;
pub mod ledger;
pub mod manifest;
pub mod primitives;
pub mod sniff;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AssetDescriptor, AssetId, AssetKind, AssetState, GatherError, Phase, RawLocator, ReadyCause,
    SettleOutcome,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use ambient::{AmbientTrack, PlaybackState};
pub use classify::{Classifier, PlannedAsset};
pub use ledger::{IgnoreReason, LedgerSnapshot, ReadinessLedger, SettleEffect, progress_percent};
pub use manifest::{Manifest, TimeoutOverrides, Timeouts};
pub use sniff::ContainerFormat;
