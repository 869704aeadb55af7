//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use gather::api::{self, AmbientResponse, AppState, AssetJson};
use gather::config::Settings;
use gather::{Coordinator, RoutingLoader, Status};
use gather_core::{Classifier, GatherError, PlannedAsset, TimeoutOverrides, Timeouts};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Plan the manifest's batch and start watching it.
fn start_batch(settings: &Settings) -> Result<Coordinator, GatherError> {
    let loader = Arc::new(RoutingLoader::new(settings.base_dir.clone()));
    Coordinator::start(settings.manifest.locators(), loader, settings.timeouts)
}

fn print_timeouts(timeouts: &Timeouts) {
    println!("  Per-asset timeout: {} ms", timeouts.per_asset.as_millis());
    println!("  Global timeout:    {} ms", timeouts.global.as_millis());
    println!("  Settle grace:      {} ms", timeouts.settle_grace.as_millis());
}

// =============================================================================
// PRELOAD COMMAND
// =============================================================================

/// Preload every asset in a manifest and report readiness.
///
/// Degraded readiness is still success; only an interrupt before readiness
/// is an error.
pub async fn cmd_preload(
    manifest: &Path,
    overrides: TimeoutOverrides,
    json_mode: bool,
) -> Result<(), GatherError> {
    let settings = Settings::load(manifest, overrides)?;
    let coordinator = start_batch(&settings)?;

    let printer = (!json_mode).then(|| tokio::spawn(print_progress(coordinator.subscribe())));

    let report = tokio::select! {
        report = coordinator.on_ready().wait() => report,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; tearing down");
            coordinator.shutdown();
            None
        }
    };

    if let Some(printer) = printer
        && let Err(e) = printer.await
    {
        tracing::debug!("Progress printer task failed: {}", e);
    }

    let report = report.ok_or_else(|| {
        GatherError::IoError("Preload interrupted before readiness".to_string())
    })?;

    let assets = coordinator.assets();
    coordinator.shutdown();

    let mut ambient = settings.manifest.ambient_track();
    if let Some(track) = ambient.as_mut()
        && track.start()
    {
        tracing::info!(locator = %track.locator, "Ambient track started");
    }

    if json_mode {
        let assets: Vec<AssetJson> = assets.into_iter().map(AssetJson::from).collect();
        let output = json!({
            "ready": true,
            "cause": report.cause.name(),
            "degraded": report.is_degraded(),
            "progress": report.progress,
            "settled": report.settled,
            "total": report.total,
            "elapsed_ms": report.elapsed_ms,
            "assets": assets,
            "ambient": AmbientResponse::from(ambient.as_ref()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
        );
        return Ok(());
    }

    println!();
    if report.is_degraded() {
        println!(
            "Ready (degraded): {}/{} assets settled after {} ms",
            report.settled, report.total, report.elapsed_ms
        );
    } else {
        println!(
            "Ready: {}/{} assets settled after {} ms",
            report.settled, report.total, report.elapsed_ms
        );
    }

    for asset in assets {
        let asset = AssetJson::from(asset);
        let label = asset.locator.as_deref().or(asset.error.as_deref()).unwrap_or("-");
        let outcome = asset.outcome.as_deref().unwrap_or(asset.state.as_str());
        println!("  #{:<4} {:<8} {:<10} {}", asset.id, asset.kind.as_deref().unwrap_or("-"), outcome, label);
    }

    if let Some(track) = &ambient {
        println!();
        println!(
            "Music: {} ({}, volume {}%)",
            track.locator,
            if track.looping { "looping" } else { "once" },
            track.volume_percent
        );
    }

    Ok(())
}

/// Print one line per progress change until ready or torn down.
async fn print_progress(mut status: watch::Receiver<Status>) {
    let mut last = None;
    loop {
        let current = *status.borrow_and_update();
        if last != Some(current.progress()) {
            println!("  Gathering... {:>3}%", current.progress());
            last = Some(current.progress());
        }
        if current.is_ready() || current.snapshot.closed {
            break;
        }
        if status.changed().await.is_err() {
            break;
        }
    }
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Preload a manifest while serving its status over HTTP.
pub async fn cmd_serve(
    manifest: &Path,
    overrides: TimeoutOverrides,
    host: &str,
    port: u16,
) -> Result<(), GatherError> {
    let settings = Settings::load(manifest, overrides)?;

    println!("Gather Status API Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Manifest: {}", manifest.display());
    print_timeouts(&settings.timeouts);
    println!();

    let coordinator = start_batch(&settings)?;
    let state = AppState::new(coordinator, settings.manifest.ambient_track());

    api::run_server(&format!("{}:{}", host, port), state).await
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Print the inferred kind of each locator.
pub fn cmd_classify(locators: &[String], json_mode: bool) -> Result<(), GatherError> {
    let results: Vec<_> = locators
        .iter()
        .map(|locator| (locator, Classifier::classify(locator)))
        .collect();

    if json_mode {
        let output: Vec<_> = results
            .iter()
            .map(|(locator, result)| match result {
                Ok(kind) => json!({ "locator": locator, "kind": kind.name() }),
                Err(e) => json!({ "locator": locator, "error": e.to_string() }),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| format!("{:?}", output))
        );
        return Ok(());
    }

    for (locator, result) in results {
        match result {
            Ok(kind) => println!("{:<6} {}", kind.name(), locator),
            Err(e) => println!("{:<6} {} ({})", "-", locator, e),
        }
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a manifest and list the assets it would preload.
pub fn cmd_check(
    manifest: &Path,
    overrides: TimeoutOverrides,
    json_mode: bool,
) -> Result<(), GatherError> {
    let settings = Settings::load(manifest, overrides)?;
    let raw = settings.manifest.locators();
    let filtered = raw.len().saturating_sub(settings.manifest.asset_count());
    let planned = Classifier::plan(raw);
    let malformed = planned
        .iter()
        .filter(|p| matches!(p, PlannedAsset::Malformed { .. }))
        .count();
    let timeouts = settings.timeouts;

    if json_mode {
        let assets: Vec<_> = planned
            .iter()
            .map(|asset| match asset {
                PlannedAsset::Watch(d) => json!({
                    "id": d.id.index(),
                    "locator": d.locator,
                    "kind": d.kind.name(),
                }),
                PlannedAsset::Malformed { id, error } => json!({
                    "id": id.index(),
                    "error": error.to_string(),
                }),
            })
            .collect();
        let output = json!({
            "manifest": manifest.display().to_string(),
            "base_dir": settings.base_dir.display().to_string(),
            "assets": assets,
            "filtered": filtered,
            "malformed": malformed,
            "timeouts": {
                "per_asset_ms": timeouts.per_asset.as_millis() as u64,
                "global_ms": timeouts.global.as_millis() as u64,
                "settle_grace_ms": timeouts.settle_grace.as_millis() as u64,
            },
            "music": settings.manifest.ambient_track().map(|t| t.locator),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
        );
        return Ok(());
    }

    println!("Manifest: {}", manifest.display());
    println!("  Assets:    {}", planned.len());
    println!("  Filtered:  {} blank or missing", filtered);
    println!("  Malformed: {}", malformed);
    print_timeouts(&timeouts);
    if timeouts.per_asset > timeouts.global {
        println!("  Note: per-asset timeout exceeds the global timeout; the global timeout wins");
    }
    println!();

    for asset in &planned {
        match asset {
            PlannedAsset::Watch(d) => println!("  {:<5} {:<6} {}", d.id.to_string(), d.kind.name(), d.locator),
            PlannedAsset::Malformed { id, error } => {
                println!("  {:<5} {:<6} {}", id.to_string(), "-", error)
            }
        }
    }

    if let Some(track) = settings.manifest.ambient_track() {
        println!();
        println!("  Music: {}", track.locator);
    }

    Ok(())
}
