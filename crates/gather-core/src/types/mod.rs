//! # Core Type Definitions
//!
//! This module contains all core types for the Gather readiness engine:
//! - Asset identifiers and descriptors (`AssetId`, `AssetKind`, `AssetDescriptor`)
//! - Locator input (`RawLocator`)
//! - Settlement and lifecycle values (`SettleOutcome`, `AssetState`, `Phase`, `ReadyCause`)
//! - Error types (`GatherError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they are used as ordered keys

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// =============================================================================
// ASSET IDENTIFIERS
// =============================================================================

/// Stable identifier of an asset within one batch.
///
/// Assigned in input order after empty and missing entries are filtered out,
/// so ids always form the dense range `0..total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub usize);

impl AssetId {
    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Media kind inferred from a locator's suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Still or animated image. Default for unrecognized suffixes.
    Image,
    /// Audio track.
    Audio,
    /// Video clip.
    Video,
}

impl AssetKind {
    /// Lowercase name used in logs and JSON output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Audio => "audio",
            AssetKind::Video => "video",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified asset: locator plus inferred kind.
///
/// Immutable once the coordinator is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Position in the filtered batch.
    pub id: AssetId,
    /// Opaque locator (path or URL).
    pub locator: String,
    /// Kind inferred from the locator suffix.
    pub kind: AssetKind,
}

impl AssetDescriptor {
    /// Create a new descriptor.
    #[must_use]
    pub fn new(id: AssetId, locator: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id,
            locator: locator.into(),
            kind,
        }
    }
}

// =============================================================================
// LOCATOR INPUT
// =============================================================================

/// One entry of the raw asset list, before filtering and classification.
///
/// Asset lists come from hand-written manifests, so entries may be missing
/// (`null`, absent keys), empty, or not strings at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLocator {
    /// A locator string. Empty strings are filtered out before counting.
    Text(String),
    /// A missing entry. Filtered out before counting.
    Missing,
    /// A non-string entry. Counted, then settled immediately as a failure.
    Malformed(String),
}

impl RawLocator {
    /// True if this entry is dropped before counting.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            RawLocator::Text(s) => s.is_empty(),
            RawLocator::Missing => true,
            RawLocator::Malformed(_) => false,
        }
    }

    /// The locator string, if this entry is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawLocator::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for RawLocator {
    fn from(s: &str) -> Self {
        RawLocator::Text(s.to_string())
    }
}

impl From<String> for RawLocator {
    fn from(s: String) -> Self {
        RawLocator::Text(s)
    }
}

impl<T: Into<RawLocator>> From<Option<T>> for RawLocator {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawLocator::Missing, Into::into)
    }
}

impl<'de> Deserialize<'de> for RawLocator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawLocatorVisitor)
    }
}

/// Accepts any value: strings become locators, null becomes missing, and
/// everything else is kept as malformed so it still counts toward the batch.
struct RawLocatorVisitor;

impl RawLocatorVisitor {
    fn malformed<E>(found: &str) -> Result<RawLocator, E> {
        Ok(RawLocator::Malformed(format!("expected a string, found {}", found)))
    }
}

impl<'de> Visitor<'de> for RawLocatorVisitor {
    type Value = RawLocator;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an asset locator")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RawLocator::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RawLocator::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawLocator::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawLocator::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Self::malformed("a boolean")
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
        Self::malformed("an integer")
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
        Self::malformed("an integer")
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Self::malformed("a float")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Self::malformed("an array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Self::malformed("a table")
    }
}

// =============================================================================
// SETTLEMENT
// =============================================================================

/// Terminal cause of an asset's settlement.
///
/// One tagged value instead of separate flags keeps the idempotency guard
/// in a single place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleOutcome {
    /// The loader reported the asset usable.
    Success,
    /// The loader reported an error, or the descriptor was malformed.
    Failure,
    /// The per-asset timer fired first.
    TimedOut,
}

impl SettleOutcome {
    /// Lowercase name used in logs and JSON output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SettleOutcome::Success => "success",
            SettleOutcome::Failure => "failure",
            SettleOutcome::TimedOut => "timed_out",
        }
    }
}

/// Per-asset lifecycle value. Pending→Settled happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "outcome")]
pub enum AssetState {
    /// Still waiting for a load signal or timeout.
    #[default]
    Pending,
    /// Settled with the recorded outcome.
    Settled(SettleOutcome),
}

impl AssetState {
    /// True once settled, whatever the outcome.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, AssetState::Settled(_))
    }
}

/// Coordinator phase. Monotonic: Loading→Ready exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Assets are still being watched.
    Loading,
    /// Terminal: downstream consumers may proceed.
    Ready,
}

impl Phase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
        }
    }
}

/// Why the coordinator became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "cause")]
pub enum ReadyCause {
    /// Every asset settled and the grace delay elapsed.
    AllSettled,
    /// The global timeout fired with assets still pending (degraded completion).
    GlobalTimeout {
        /// Number of assets that never settled.
        pending: usize,
    },
    /// The filtered asset list was empty.
    NothingToLoad,
}

impl ReadyCause {
    /// True for degraded completion.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, ReadyCause::GlobalTimeout { .. })
    }

    /// Snake-case name, matching the serialized tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ReadyCause::AllSettled => "all_settled",
            ReadyCause::GlobalTimeout { .. } => "global_timeout",
            ReadyCause::NothingToLoad => "nothing_to_load",
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Gather.
///
/// None of these are fatal to the readiness lifecycle: asset-level errors
/// become settlements, never coordinator failures.
#[derive(Debug, Error)]
pub enum GatherError {
    /// The locator cannot be classified.
    #[error("Malformed locator: {0}")]
    MalformedLocator(String),

    /// Fetched bytes do not decode as the expected media kind.
    #[error("Undecodable {expected} asset")]
    Undecodable {
        /// Kind inferred from the locator.
        expected: AssetKind,
    },

    /// The batch exceeds the accepted size.
    #[error("Too many assets: {count} exceeds maximum {max}")]
    TooManyAssets {
        /// Number of assets after filtering.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },

    /// The manifest could not be parsed.
    #[error("Manifest error: {0}")]
    ManifestError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
