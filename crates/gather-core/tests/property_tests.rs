//! # Property-Based Tests
//!
//! Ledger invariants under arbitrary, unordered signal sequences.

use gather_core::{
    AssetId, Classifier, Phase, ReadinessLedger, SettleEffect, SettleOutcome, progress_percent,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// A signal the runtime might deliver to the ledger.
#[derive(Debug, Clone)]
enum Event {
    Settle(usize, SettleOutcome),
    GlobalTimeout,
    GraceElapsed,
}

fn outcome() -> impl Strategy<Value = SettleOutcome> {
    prop_oneof![
        Just(SettleOutcome::Success),
        Just(SettleOutcome::Failure),
        Just(SettleOutcome::TimedOut),
    ]
}

fn event(total: usize) -> impl Strategy<Value = Event> {
    prop_oneof![
        8 => (0..total + 2, outcome()).prop_map(|(id, o)| Event::Settle(id, o)),
        1 => Just(Event::GlobalTimeout),
        1 => Just(Event::GraceElapsed),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Event>)> {
    (1usize..20).prop_flat_map(|total| (Just(total), vec(event(total), 0..80)))
}

proptest! {
    /// Settled count equals the number of distinct known ids delivered
    /// before readiness, whatever the order or duplication.
    #[test]
    fn settled_count_matches_distinct_ids(
        total in 1usize..30,
        ids in vec(0usize..40, 0..120)
    ) {
        let mut ledger = ReadinessLedger::new(total);
        let mut distinct = BTreeSet::new();

        for id in &ids {
            let effect = ledger.settle(AssetId(*id), SettleOutcome::Success);
            let fresh = *id < total && distinct.insert(*id);
            prop_assert_eq!(effect.is_recorded(), fresh);
        }

        prop_assert_eq!(ledger.settled(), distinct.len());
    }

    /// Progress never decreases and reads 100 only when nothing is pending.
    #[test]
    fn progress_monotonic_and_honest((total, events) in scenario()) {
        let mut ledger = ReadinessLedger::new(total);
        let mut last = ledger.progress();

        for event in events {
            match event {
                Event::Settle(id, o) => { ledger.settle(AssetId(id), o); }
                Event::GlobalTimeout => { ledger.force_ready(); }
                Event::GraceElapsed => { ledger.complete_grace(); }
            }
            let now = ledger.progress();
            prop_assert!(now >= last);
            if now == 100 {
                prop_assert_eq!(ledger.pending(), 0);
            }
            last = now;
        }
    }

    /// Readiness fires at most once across every path, and never reverts.
    #[test]
    fn ready_fires_at_most_once((total, events) in scenario()) {
        let mut ledger = ReadinessLedger::new(total);
        let mut fired = 0usize;
        let mut all_settled_effects = 0usize;

        for event in events {
            let was_ready = ledger.phase() == Phase::Ready;
            match event {
                Event::Settle(id, o) => {
                    if ledger.settle(AssetId(id), o) == SettleEffect::AllSettled {
                        all_settled_effects += 1;
                    }
                }
                Event::GlobalTimeout => {
                    if ledger.force_ready().is_some() { fired += 1; }
                }
                Event::GraceElapsed => {
                    if ledger.complete_grace().is_some() { fired += 1; }
                }
            }
            if was_ready {
                prop_assert_eq!(ledger.phase(), Phase::Ready);
            }
        }

        prop_assert!(fired <= 1);
        prop_assert!(all_settled_effects <= 1);
        prop_assert_eq!(fired == 1, ledger.phase() == Phase::Ready);
    }

    /// Degraded readiness always reports the exact number of stragglers.
    #[test]
    fn forced_ready_counts_pending(
        total in 1usize..30,
        settled in vec(0usize..30, 0..30)
    ) {
        let mut ledger = ReadinessLedger::new(total);
        for id in settled {
            ledger.settle(AssetId(id), SettleOutcome::Failure);
        }
        let pending = ledger.pending();

        match ledger.force_ready() {
            Some(cause) => {
                prop_assert!(pending > 0);
                prop_assert_eq!(cause, gather_core::ReadyCause::GlobalTimeout { pending });
            }
            None => prop_assert_eq!(pending, 0),
        }
    }

    /// Percent is bounded and only the complete count reaches 100.
    #[test]
    fn percent_bounds(total in 1usize..10_000, settled in 0usize..10_000) {
        let settled = settled.min(total);
        let p = progress_percent(settled, total);
        prop_assert!(p <= 100);
        prop_assert_eq!(p == 100, settled == total);
    }

    /// Planning never numbers blank entries and keeps ids dense.
    #[test]
    fn plan_ids_are_dense(entries in vec(prop_oneof![
        Just(String::new()),
        "[a-z]{1,8}\\.(png|mp4|mp3|ogg|webm|wav|jpg)",
    ], 0..40)) {
        let expected = entries.iter().filter(|e| !e.is_empty()).count();
        let planned = Classifier::plan(entries);

        prop_assert_eq!(planned.len(), expected);
        for (index, asset) in planned.iter().enumerate() {
            prop_assert_eq!(asset.id(), AssetId(index));
        }
    }
}
