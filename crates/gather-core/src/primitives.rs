//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Gather readiness engine.
//!
//! These values are compiled into the binary. Runtime overrides (manifest
//! `[timeouts]` section, CLI flags) replace the timing defaults only; the
//! classification tables and input limits are fixed.

/// Default per-asset timeout: an asset that neither loads nor fails within
/// this window is force-settled as `TimedOut`.
pub const DEFAULT_PER_ASSET_TIMEOUT_MS: u64 = 5_000;

/// Default coordinator-wide timeout.
///
/// When it elapses with assets still pending, readiness is forced
/// (degraded completion).
pub const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 10_000;

/// Delay between the last settlement and the Ready transition, so a
/// progress indicator can show 100% before downstream screens take over.
pub const DEFAULT_SETTLE_GRACE_MS: u64 = 400;

/// Progress value reported once every asset has settled.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Highest progress value reported while any asset is still pending.
///
/// Rounding alone would report 100 for 199 of 200 settled assets.
pub const PROGRESS_PENDING_CEILING: u8 = 99;

// =============================================================================
// CLASSIFICATION TABLES
// =============================================================================

/// Locator suffixes (lowercase, without the dot) classified as video.
pub const VIDEO_SUFFIXES: &[&str] = &["mp4", "webm"];

/// Locator suffixes (lowercase, without the dot) classified as audio.
pub const AUDIO_SUFFIXES: &[&str] = &["mp3", "wav", "ogg"];

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a single locator string.
///
/// Longer locators are classified as malformed.
pub const MAX_LOCATOR_LENGTH: usize = 4096;

/// Maximum number of assets accepted in a single batch.
pub const MAX_ASSETS: usize = 10_000;

/// Number of leading bytes inspected when verifying a fetched asset.
pub const SNIFF_LEN: usize = 64;

// =============================================================================
// AMBIENT TRACK
// =============================================================================

/// Default ambient track volume, in percent.
pub const DEFAULT_AMBIENT_VOLUME: u8 = 40;
