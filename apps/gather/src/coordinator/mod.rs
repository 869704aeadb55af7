//! # Readiness Coordinator
//!
//! The async runtime around `gather-core`'s [`ReadinessLedger`].
//!
//! One coordinator watches one batch of assets:
//!
//! ```text
//!  Coordinator::start
//!      │
//!      ├── watcher task per asset:  select!(loader.load, per-asset sleep)
//!      ├── global timer task:       sleep(global) ──► force_ready
//!      └── grace task (on demand):  sleep(grace)  ──► complete_grace
//!
//!  every task ──► Shared::settle / force_ready / complete_grace
//!                     │  (one mutex around the ledger)
//!                     ▼
//!                 watch::Sender<Status> ──► subscribers, ReadyListener
//! ```
//!
//! ## Guarantees
//!
//! - An empty batch is ready before `start` returns
//! - Readiness is published exactly once, together with the Ready phase
//! - After `shutdown` (or drop) no task can change the published state

mod shared;
mod tasks;

use gather_core::{
    AssetDescriptor, AssetId, AssetKind, AssetState, Classifier, GatherError, LedgerSnapshot,
    PlannedAsset, RawLocator, ReadyCause, SettleEffect, SettleOutcome, Timeouts,
};
use serde::Serialize;
use shared::{Entry, Shared};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::loader::AssetLoader;

// =============================================================================
// STATUS TYPES
// =============================================================================

/// Delivered once, when the batch becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyReport {
    pub cause: ReadyCause,
    pub settled: usize,
    pub total: usize,
    pub progress: u8,
    /// Time from `start` to readiness.
    pub elapsed_ms: u64,
}

impl ReadyReport {
    /// True when the global timeout forced readiness.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.cause.is_degraded()
    }
}

/// The published coordinator state.
///
/// `report` is `Some` exactly when the snapshot's phase is Ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
    pub snapshot: LedgerSnapshot,
    pub report: Option<ReadyReport>,
}

impl Status {
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.snapshot.progress
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.report.is_some()
    }
}

/// One asset as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetView {
    pub id: AssetId,
    /// `None` for entries that were not strings.
    pub locator: Option<String>,
    /// `None` for malformed entries.
    pub kind: Option<AssetKind>,
    pub state: AssetState,
    /// Why a malformed entry was settled without loading.
    pub error: Option<String>,
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Watches one batch of assets until it is ready or torn down.
///
/// Dropping the coordinator tears it down.
pub struct Coordinator {
    shared: Arc<Shared>,
    status: watch::Receiver<Status>,
}

impl Coordinator {
    /// Plan the batch and start watching it.
    ///
    /// Must be called from within a tokio runtime. Blank entries are
    /// dropped; malformed entries count toward the batch and settle as
    /// failures immediately. Fails only when no runtime is available.
    pub fn start<L, I>(entries: I, loader: Arc<L>, timeouts: Timeouts) -> Result<Self, GatherError>
    where
        L: AssetLoader + 'static,
        I: IntoIterator,
        I::Item: Into<RawLocator>,
    {
        let runtime = Handle::try_current()
            .map_err(|e| GatherError::IoError(format!("No async runtime: {}", e)))?;
        let planned = Classifier::plan(entries);

        let entries: Vec<Entry> = planned.iter().map(Entry::from_planned).collect();
        let shared = Arc::new(Shared::new(entries, runtime, timeouts.settle_grace));
        let status = shared.subscribe();
        let coordinator = Self { shared, status };

        if coordinator.status.borrow().is_ready() {
            tracing::info!("Nothing to load; ready immediately");
            return Ok(coordinator);
        }

        tracing::info!(
            assets = planned.len(),
            per_asset_ms = timeouts.per_asset.as_millis() as u64,
            global_ms = timeouts.global.as_millis() as u64,
            "Preloading assets"
        );
        if timeouts.per_asset > timeouts.global {
            tracing::debug!("Per-asset timeout exceeds global timeout; global timeout wins");
        }

        for asset in planned {
            match asset {
                PlannedAsset::Watch(descriptor) => {
                    coordinator.spawn_watcher(Arc::clone(&loader), descriptor, timeouts);
                }
                PlannedAsset::Malformed { id, error } => {
                    tracing::warn!(asset = %id, error = %error, "Malformed asset entry; settling as failure");
                    coordinator.shared.settle(id, SettleOutcome::Failure);
                }
            }
        }

        let shared = Arc::clone(&coordinator.shared);
        let global = timeouts.global;
        coordinator
            .shared
            .track(async move { tasks::global_timer(shared, global).await });

        Ok(coordinator)
    }

    fn spawn_watcher<L>(&self, loader: Arc<L>, asset: AssetDescriptor, timeouts: Timeouts)
    where
        L: AssetLoader + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.shared.track(async move {
            tasks::watch_asset(shared, loader, asset, timeouts.per_asset).await;
        });
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current progress, 0..=100.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.status.borrow().progress()
    }

    /// Current published status.
    #[must_use]
    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.shared.subscribe()
    }

    /// A listener resolving once with the ready report.
    #[must_use]
    pub fn on_ready(&self) -> ReadyListener {
        ReadyListener {
            status: self.shared.subscribe(),
        }
    }

    /// Per-asset view, in batch order.
    #[must_use]
    pub fn assets(&self) -> Vec<AssetView> {
        self.shared.assets()
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Deliver an external settlement signal. Idempotent.
    pub fn report(&self, id: AssetId, outcome: SettleOutcome) -> SettleEffect {
        self.shared.settle(id, outcome)
    }

    /// A cloneable handle for delivering settlement signals from elsewhere.
    #[must_use]
    pub fn settler(&self) -> Settler {
        Settler {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Tear down: freeze state and cancel every task.
    ///
    /// Returns true on the first call only.
    pub fn shutdown(&self) -> bool {
        self.shared.shutdown()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Delivers settlement signals for callback-style loaders.
///
/// Holding a settler does not keep the batch alive: once the coordinator is
/// torn down every report is ignored.
#[derive(Clone)]
pub struct Settler {
    shared: Arc<Shared>,
}

impl Settler {
    pub fn report(&self, id: AssetId, outcome: SettleOutcome) -> SettleEffect {
        self.shared.settle(id, outcome)
    }
}

/// Resolves once with the ready report, or `None` after an early teardown.
#[derive(Debug)]
pub struct ReadyListener {
    status: watch::Receiver<Status>,
}

impl ReadyListener {
    pub async fn wait(mut self) -> Option<ReadyReport> {
        let status = self
            .status
            .wait_for(|s| s.is_ready() || s.snapshot.closed)
            .await
            .ok()
            .map(|status| *status)?;
        status.report
    }
}
