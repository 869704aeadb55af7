//! # Readiness Ledger
//!
//! The single owner of per-asset settlement state and the aggregate phase.
//!
//! The ledger is a synchronous state machine. It never starts timers or
//! loads anything; the runtime delivers settlement signals, timer expiries
//! and teardown to it and acts on the returned effects.
//!
//! ## Invariants
//!
//! - Each asset transitions Pending→Settled at most once (per-asset guard)
//! - `settled` changes only through a recorded settlement
//! - Phase transitions Loading→Ready at most once
//! - Once ready or closed, every operation is a no-op
//! - Progress is non-decreasing and is 100 only when nothing is pending

use crate::primitives::{PROGRESS_COMPLETE, PROGRESS_PENDING_CEILING};
use crate::{AssetId, AssetState, Phase, ReadyCause, SettleOutcome};
use serde::{Deserialize, Serialize};

/// Compute aggregate progress from counts.
///
/// `round(settled / total * 100)` in integer arithmetic (half rounds up),
/// capped below 100 while anything is pending. An empty batch is complete.
#[must_use]
pub fn progress_percent(settled: usize, total: usize) -> u8 {
    if total == 0 || settled >= total {
        return PROGRESS_COMPLETE;
    }
    let settled = settled as u64;
    let total = total as u64;
    let rounded = settled
        .saturating_mul(100)
        .saturating_add(total / 2)
        .checked_div(total)
        .unwrap_or(0);
    rounded.min(u64::from(PROGRESS_PENDING_CEILING)) as u8
}

/// Why a settlement signal was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The asset already settled with this outcome.
    AlreadySettled(SettleOutcome),
    /// The id is outside the batch.
    UnknownAsset,
    /// The coordinator already became ready.
    AlreadyReady,
    /// The coordinator was torn down.
    Closed,
}

/// Effect of delivering a settlement signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleEffect {
    /// Recorded; other assets are still pending.
    Recorded {
        /// Progress after this settlement.
        progress: u8,
    },
    /// Recorded, and it was the last pending asset. The runtime should arm
    /// the grace delay and then call [`ReadinessLedger::complete_grace`].
    AllSettled,
    /// Not recorded.
    Ignored(IgnoreReason),
}

impl SettleEffect {
    /// True if the signal changed the settled count.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, SettleEffect::Recorded { .. } | SettleEffect::AllSettled)
    }
}

/// Point-in-time view of the aggregate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Aggregate progress, 0..=100.
    pub progress: u8,
    /// Number of settled assets.
    pub settled: usize,
    /// Number of assets in the batch.
    pub total: usize,
    /// Current phase.
    pub phase: Phase,
    /// Why readiness fired, once it has.
    pub cause: Option<ReadyCause>,
    /// True once torn down.
    pub closed: bool,
}

impl LedgerSnapshot {
    /// True once the phase is Ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Number of assets still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.settled)
    }
}

/// Readiness Ledger - per-asset guards plus the aggregate phase.
#[derive(Debug, Clone)]
pub struct ReadinessLedger {
    /// Indexed by `AssetId`.
    assets: Vec<AssetState>,
    settled: usize,
    phase: Phase,
    cause: Option<ReadyCause>,
    closed: bool,
}

impl ReadinessLedger {
    /// Create a ledger for `total` assets.
    ///
    /// An empty batch is ready on construction with `NothingToLoad`, so
    /// callers never wait on a timer to learn there is nothing to do.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let (phase, cause) = if total == 0 {
            (Phase::Ready, Some(ReadyCause::NothingToLoad))
        } else {
            (Phase::Loading, None)
        };

        Self {
            assets: vec![AssetState::Pending; total],
            settled: 0,
            phase,
            cause,
            closed: false,
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Deliver a settlement signal for one asset.
    pub fn settle(&mut self, id: AssetId, outcome: SettleOutcome) -> SettleEffect {
        if self.closed {
            return SettleEffect::Ignored(IgnoreReason::Closed);
        }
        if self.phase == Phase::Ready {
            return SettleEffect::Ignored(IgnoreReason::AlreadyReady);
        }

        let Some(state) = self.assets.get_mut(id.index()) else {
            return SettleEffect::Ignored(IgnoreReason::UnknownAsset);
        };

        if let AssetState::Settled(previous) = *state {
            return SettleEffect::Ignored(IgnoreReason::AlreadySettled(previous));
        }

        *state = AssetState::Settled(outcome);
        self.settled = self.settled.saturating_add(1);

        if self.settled == self.assets.len() {
            SettleEffect::AllSettled
        } else {
            SettleEffect::Recorded {
                progress: self.progress(),
            }
        }
    }

    /// Finish the settle-to-ready grace delay.
    ///
    /// Returns the cause if this call made the ledger ready.
    pub fn complete_grace(&mut self) -> Option<ReadyCause> {
        if self.closed || self.phase == Phase::Ready || self.settled < self.assets.len() {
            return None;
        }
        Some(self.become_ready(ReadyCause::AllSettled))
    }

    /// Global timeout expiry.
    ///
    /// Forces readiness if assets are still pending. When everything has
    /// settled the grace delay is already in flight and wins instead.
    pub fn force_ready(&mut self) -> Option<ReadyCause> {
        if self.closed || self.phase == Phase::Ready {
            return None;
        }
        let pending = self.pending();
        if pending == 0 {
            return None;
        }
        Some(self.become_ready(ReadyCause::GlobalTimeout { pending }))
    }

    /// Tear down. Returns true on the first call only.
    pub fn close(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    fn become_ready(&mut self, cause: ReadyCause) -> ReadyCause {
        self.phase = Phase::Ready;
        self.cause = Some(cause);
        cause
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current aggregate progress.
    #[must_use]
    pub fn progress(&self) -> u8 {
        progress_percent(self.settled, self.assets.len())
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Why readiness fired, once it has.
    #[must_use]
    pub fn cause(&self) -> Option<ReadyCause> {
        self.cause
    }

    /// True once torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of settled assets.
    #[must_use]
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Number of assets in the batch.
    #[must_use]
    pub fn total(&self) -> usize {
        self.assets.len()
    }

    /// Number of assets still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.assets.len().saturating_sub(self.settled)
    }

    /// State of one asset.
    #[must_use]
    pub fn state(&self, id: AssetId) -> Option<AssetState> {
        self.assets.get(id.index()).copied()
    }

    /// Ids of assets still pending, in order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<AssetId> {
        self.assets
            .iter()
            .enumerate()
            .filter(|(_, state)| !state.is_settled())
            .map(|(index, _)| AssetId(index))
            .collect()
    }

    /// All per-asset states, in id order.
    pub fn states(&self) -> impl Iterator<Item = (AssetId, AssetState)> + '_ {
        self.assets
            .iter()
            .enumerate()
            .map(|(index, state)| (AssetId(index), *state))
    }

    /// Aggregate snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            progress: self.progress(),
            settled: self.settled,
            total: self.assets.len(),
            phase: self.phase,
            cause: self.cause,
            closed: self.closed,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(3, 3), 100);
    }

    #[test]
    fn progress_capped_while_pending() {
        assert_eq!(progress_percent(199, 200), 99);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn empty_batch_is_ready_on_construction() {
        let ledger = ReadinessLedger::new(0);
        assert_eq!(ledger.phase(), Phase::Ready);
        assert_eq!(ledger.cause(), Some(ReadyCause::NothingToLoad));
        assert_eq!(ledger.progress(), 100);
    }

    #[test]
    fn settles_each_asset_once() {
        let mut ledger = ReadinessLedger::new(2);

        assert_eq!(
            ledger.settle(AssetId(0), SettleOutcome::Success),
            SettleEffect::Recorded { progress: 50 }
        );
        assert_eq!(
            ledger.settle(AssetId(0), SettleOutcome::Failure),
            SettleEffect::Ignored(IgnoreReason::AlreadySettled(SettleOutcome::Success))
        );
        assert_eq!(ledger.settled(), 1);
        assert_eq!(
            ledger.state(AssetId(0)),
            Some(AssetState::Settled(SettleOutcome::Success))
        );
    }

    #[test]
    fn guard_is_per_asset() {
        let mut ledger = ReadinessLedger::new(2);
        ledger.settle(AssetId(0), SettleOutcome::TimedOut);

        let effect = ledger.settle(AssetId(1), SettleOutcome::Success);
        assert_eq!(effect, SettleEffect::AllSettled);
        assert_eq!(ledger.settled(), 2);
    }

    #[test]
    fn success_after_timeout_is_ignored() {
        let mut ledger = ReadinessLedger::new(2);
        ledger.settle(AssetId(1), SettleOutcome::TimedOut);

        let effect = ledger.settle(AssetId(1), SettleOutcome::Success);
        assert_eq!(
            effect,
            SettleEffect::Ignored(IgnoreReason::AlreadySettled(SettleOutcome::TimedOut))
        );
        assert_eq!(ledger.settled(), 1);
    }

    #[test]
    fn unknown_asset_ignored() {
        let mut ledger = ReadinessLedger::new(1);
        assert_eq!(
            ledger.settle(AssetId(5), SettleOutcome::Success),
            SettleEffect::Ignored(IgnoreReason::UnknownAsset)
        );
    }

    #[test]
    fn all_settled_waits_for_grace() {
        let mut ledger = ReadinessLedger::new(1);
        ledger.settle(AssetId(0), SettleOutcome::Success);

        assert_eq!(ledger.phase(), Phase::Loading);
        assert_eq!(ledger.progress(), 100);

        assert_eq!(ledger.complete_grace(), Some(ReadyCause::AllSettled));
        assert_eq!(ledger.phase(), Phase::Ready);
        assert_eq!(ledger.complete_grace(), None);
    }

    #[test]
    fn grace_does_nothing_while_pending() {
        let mut ledger = ReadinessLedger::new(2);
        ledger.settle(AssetId(0), SettleOutcome::Success);
        assert_eq!(ledger.complete_grace(), None);
        assert_eq!(ledger.phase(), Phase::Loading);
    }

    #[test]
    fn force_ready_reports_pending_once() {
        let mut ledger = ReadinessLedger::new(3);
        ledger.settle(AssetId(0), SettleOutcome::Success);
        ledger.settle(AssetId(2), SettleOutcome::Failure);

        assert_eq!(
            ledger.force_ready(),
            Some(ReadyCause::GlobalTimeout { pending: 1 })
        );
        assert_eq!(ledger.force_ready(), None);
        assert_eq!(ledger.pending_ids(), vec![AssetId(1)]);
    }

    #[test]
    fn force_ready_defers_to_grace_when_all_settled() {
        let mut ledger = ReadinessLedger::new(1);
        ledger.settle(AssetId(0), SettleOutcome::Success);

        assert_eq!(ledger.force_ready(), None);
        assert_eq!(ledger.complete_grace(), Some(ReadyCause::AllSettled));
    }

    #[test]
    fn inert_after_ready() {
        let mut ledger = ReadinessLedger::new(2);
        ledger.force_ready();

        assert_eq!(
            ledger.settle(AssetId(0), SettleOutcome::Success),
            SettleEffect::Ignored(IgnoreReason::AlreadyReady)
        );
        assert_eq!(ledger.settled(), 0);
    }

    #[test]
    fn closed_ledger_rejects_everything() {
        let mut ledger = ReadinessLedger::new(2);
        assert!(ledger.close());
        assert!(!ledger.close());

        assert_eq!(
            ledger.settle(AssetId(0), SettleOutcome::Success),
            SettleEffect::Ignored(IgnoreReason::Closed)
        );
        assert_eq!(ledger.force_ready(), None);
        assert_eq!(ledger.complete_grace(), None);
        assert_eq!(ledger.phase(), Phase::Loading);
        assert!(ledger.snapshot().closed);
    }
}
