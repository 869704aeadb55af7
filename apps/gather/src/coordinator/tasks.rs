//! The coordinator's task bodies.

use super::shared::Shared;
use crate::loader::AssetLoader;
use gather_core::{AssetDescriptor, SettleOutcome};
use std::sync::Arc;
use std::time::Duration;

/// Race one asset's load against its per-asset timer; settle the winner.
pub(super) async fn watch_asset<L>(
    shared: Arc<Shared>,
    loader: Arc<L>,
    asset: AssetDescriptor,
    per_asset: Duration,
) where
    L: AssetLoader,
{
    let outcome = tokio::select! {
        result = loader.load(&asset) => match result {
            Ok(()) => SettleOutcome::Success,
            Err(e) => {
                tracing::info!(asset = %asset.id, kind = %asset.kind, error = %e, "Asset failed to load");
                SettleOutcome::Failure
            }
        },
        () = tokio::time::sleep(per_asset) => {
            tracing::info!(
                asset = %asset.id,
                locator = %asset.locator,
                timeout_ms = per_asset.as_millis() as u64,
                "Asset timed out"
            );
            SettleOutcome::TimedOut
        }
    };

    shared.settle(asset.id, outcome);
}

pub(super) async fn global_timer(shared: Arc<Shared>, global: Duration) {
    tokio::time::sleep(global).await;
    shared.force_ready();
}

pub(super) async fn settle_grace(shared: Arc<Shared>, grace: Duration) {
    tokio::time::sleep(grace).await;
    shared.complete_grace();
}
