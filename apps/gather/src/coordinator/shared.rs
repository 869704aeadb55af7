//! State shared between the coordinator handle and its tasks.

use super::{AssetView, ReadyReport, Status, tasks};
use gather_core::{
    AssetId, AssetKind, PlannedAsset, ReadinessLedger, ReadyCause, SettleEffect, SettleOutcome,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Static description of one batch entry.
pub(super) struct Entry {
    locator: Option<String>,
    kind: Option<AssetKind>,
    error: Option<String>,
}

impl Entry {
    pub(super) fn from_planned(planned: &PlannedAsset) -> Self {
        match planned {
            PlannedAsset::Watch(descriptor) => Self {
                locator: Some(descriptor.locator.clone()),
                kind: Some(descriptor.kind),
                error: None,
            },
            PlannedAsset::Malformed { error, .. } => Self {
                locator: None,
                kind: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// The ledger, its published status and every task working on it.
///
/// Lock order: `ledger` before `tasks`.
pub(super) struct Shared {
    ledger: Mutex<ReadinessLedger>,
    entries: Vec<Entry>,
    status: watch::Sender<Status>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    runtime: Handle,
    started: Instant,
    settle_grace: Duration,
}

impl Shared {
    pub(super) fn new(entries: Vec<Entry>, runtime: Handle, settle_grace: Duration) -> Self {
        let ledger = ReadinessLedger::new(entries.len());
        let report = ledger
            .cause()
            .map(|cause| ready_report(&ledger, cause, Duration::ZERO));
        let (status, _) = watch::channel(Status {
            snapshot: ledger.snapshot(),
            report,
        });

        Self {
            ledger: Mutex::new(ledger),
            entries,
            status,
            tasks: Mutex::new(Vec::new()),
            runtime,
            started: Instant::now(),
            settle_grace,
        }
    }

    fn lock_ledger(&self) -> MutexGuard<'_, ReadinessLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// Spawn a task owned by this batch; aborted on shutdown.
    pub(super) fn track<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.runtime.spawn(future);
        self.lock_tasks().push(handle);
    }

    /// Publish the ledger's snapshot; `report` is set only on the ready edge.
    fn publish(&self, ledger: &ReadinessLedger, report: Option<ReadyReport>) {
        let snapshot = ledger.snapshot();
        self.status.send_modify(|status| {
            status.snapshot = snapshot;
            if report.is_some() {
                status.report = report;
            }
        });
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    pub(super) fn settle(self: &Arc<Self>, id: AssetId, outcome: SettleOutcome) -> SettleEffect {
        let mut ledger = self.lock_ledger();
        let effect = ledger.settle(id, outcome);

        match effect {
            SettleEffect::Recorded { progress } => {
                tracing::debug!(asset = %id, outcome = outcome.name(), progress, "Asset settled");
                self.publish(&ledger, None);
            }
            SettleEffect::AllSettled => {
                tracing::debug!(asset = %id, outcome = outcome.name(), "All assets settled");
                self.publish(&ledger, None);

                let shared = Arc::clone(self);
                let grace = self.settle_grace;
                self.track(async move { tasks::settle_grace(shared, grace).await });
            }
            SettleEffect::Ignored(reason) => {
                tracing::trace!(asset = %id, outcome = outcome.name(), ?reason, "Settlement ignored");
            }
        }

        effect
    }

    /// Global timeout expiry. Aborts the straggler watchers once ready.
    pub(super) fn force_ready(&self) {
        {
            let mut ledger = self.lock_ledger();
            let stragglers = ledger.pending_ids();

            let Some(cause) = ledger.force_ready() else {
                tracing::debug!("Global timeout elapsed without effect");
                return;
            };

            let locators: Vec<&str> = stragglers
                .iter()
                .filter_map(|id| self.entries.get(id.index()))
                .filter_map(|entry| entry.locator.as_deref())
                .collect();
            tracing::warn!(
                pending = stragglers.len(),
                stragglers = ?locators,
                "Global timeout reached with assets still pending; forcing readiness"
            );

            self.become_ready(&ledger, cause);
        }

        // Includes the calling timer task, which finishes without yielding.
        let aborted = self.abort_tasks();
        tracing::debug!(tasks = aborted, "Straggler watchers aborted");
    }

    /// Grace delay expiry.
    pub(super) fn complete_grace(&self) {
        let mut ledger = self.lock_ledger();
        if let Some(cause) = ledger.complete_grace() {
            self.become_ready(&ledger, cause);
        }
    }

    fn become_ready(&self, ledger: &ReadinessLedger, cause: ReadyCause) {
        let report = ready_report(ledger, cause, self.started.elapsed());
        tracing::info!(
            settled = report.settled,
            total = report.total,
            elapsed_ms = report.elapsed_ms,
            degraded = report.is_degraded(),
            "Assets ready"
        );
        self.publish(ledger, Some(report));
    }

    /// Close the ledger, then abort every task. Returns true on the first call.
    pub(super) fn shutdown(&self) -> bool {
        let first = {
            let mut ledger = self.lock_ledger();
            let first = ledger.close();
            if first {
                self.publish(&ledger, None);
            }
            first
        };

        let aborted = self.abort_tasks();
        if first {
            tracing::debug!(tasks = aborted, "Coordinator torn down");
        }
        first
    }

    /// Abort and forget every tracked task.
    fn abort_tasks(&self) -> usize {
        let tasks = std::mem::take(&mut *self.lock_tasks());
        for task in &tasks {
            task.abort();
        }
        tasks.len()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub(super) fn assets(&self) -> Vec<AssetView> {
        let ledger = self.lock_ledger();
        ledger
            .states()
            .zip(&self.entries)
            .map(|((id, state), entry)| AssetView {
                id,
                locator: entry.locator.clone(),
                kind: entry.kind,
                state,
                error: entry.error.clone(),
            })
            .collect()
    }
}

fn ready_report(ledger: &ReadinessLedger, cause: ReadyCause, elapsed: Duration) -> ReadyReport {
    ReadyReport {
        cause,
        settled: ledger.settled(),
        total: ledger.total(),
        progress: ledger.progress(),
        elapsed_ms: elapsed.as_millis() as u64,
    }
}
