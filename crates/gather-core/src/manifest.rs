//! # Manifest Module
//!
//! The asset manifest: which assets to preload and how long to wait.
//!
//! The manifest model is format-agnostic; the binary parses it from TOML or
//! JSON. Asset order is `media…`, then `video`, then `music`.
//!
//! ```toml
//! media = ["photos/1.jpg", "photos/2.png"]
//! video = "clips/intro.mp4"
//! music = "audio/theme.mp3"
//!
//! [timeouts]
//! per_asset_ms = 5000
//! global_ms = 10000
//! settle_grace_ms = 400
//! ```

use crate::ambient::AmbientTrack;
use crate::primitives::{
    DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_PER_ASSET_TIMEOUT_MS, DEFAULT_SETTLE_GRACE_MS,
};
use crate::RawLocator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Resolved timing configuration for one coordinator.
///
/// The per-asset and global timeouts are independent: a per-asset timeout
/// longer than the global one is accepted, and the global timeout then
/// decides when readiness is forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long one asset may stay pending.
    pub per_asset: Duration,
    /// How long the whole batch may stay loading.
    pub global: Duration,
    /// Delay between the last settlement and Ready.
    pub settle_grace: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            per_asset: Duration::from_millis(DEFAULT_PER_ASSET_TIMEOUT_MS),
            global: Duration::from_millis(DEFAULT_GLOBAL_TIMEOUT_MS),
            settle_grace: Duration::from_millis(DEFAULT_SETTLE_GRACE_MS),
        }
    }
}

impl Timeouts {
    /// Create timeouts from millisecond values.
    #[must_use]
    pub fn from_millis(per_asset_ms: u64, global_ms: u64, settle_grace_ms: u64) -> Self {
        Self {
            per_asset: Duration::from_millis(per_asset_ms),
            global: Duration::from_millis(global_ms),
            settle_grace: Duration::from_millis(settle_grace_ms),
        }
    }
}

/// Optional timeout values, in milliseconds, from a manifest or CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeoutOverrides {
    pub per_asset_ms: Option<u64>,
    pub global_ms: Option<u64>,
    pub settle_grace_ms: Option<u64>,
}

impl TimeoutOverrides {
    /// Layer `over` on top of `self`; set values in `over` win.
    #[must_use]
    pub fn overlay(self, over: TimeoutOverrides) -> Self {
        Self {
            per_asset_ms: over.per_asset_ms.or(self.per_asset_ms),
            global_ms: over.global_ms.or(self.global_ms),
            settle_grace_ms: over.settle_grace_ms.or(self.settle_grace_ms),
        }
    }

    /// Fill unset values with the built-in defaults.
    #[must_use]
    pub fn resolve(&self) -> Timeouts {
        Timeouts::from_millis(
            self.per_asset_ms.unwrap_or(DEFAULT_PER_ASSET_TIMEOUT_MS),
            self.global_ms.unwrap_or(DEFAULT_GLOBAL_TIMEOUT_MS),
            self.settle_grace_ms.unwrap_or(DEFAULT_SETTLE_GRACE_MS),
        )
    }
}

// =============================================================================
// MANIFEST
// =============================================================================

/// The asset manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Photos and other gallery media.
    #[serde(default)]
    pub media: Vec<RawLocator>,
    /// Slideshow clip.
    #[serde(default)]
    pub video: Option<RawLocator>,
    /// Background music; also becomes the ambient track.
    #[serde(default)]
    pub music: Option<RawLocator>,
    /// Timeout overrides.
    #[serde(default)]
    pub timeouts: TimeoutOverrides,
}

impl Manifest {
    /// Flatten to the raw asset list, unfiltered.
    #[must_use]
    pub fn locators(&self) -> Vec<RawLocator> {
        self.media
            .iter()
            .cloned()
            .chain(std::iter::once(self.video.clone().unwrap_or(RawLocator::Missing)))
            .chain(std::iter::once(self.music.clone().unwrap_or(RawLocator::Missing)))
            .collect()
    }

    /// Number of entries that survive filtering.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.locators().iter().filter(|l| !l.is_blank()).count()
    }

    /// The ambient track, if the manifest names a music locator.
    #[must_use]
    pub fn ambient_track(&self) -> Option<AmbientTrack> {
        self.music
            .as_ref()
            .and_then(RawLocator::as_text)
            .filter(|locator| !locator.trim().is_empty())
            .map(AmbientTrack::new)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_order_is_media_video_music() {
        let manifest = Manifest {
            media: vec!["1.jpg".into(), "2.png".into()],
            video: Some("intro.mp4".into()),
            music: Some("theme.mp3".into()),
            timeouts: TimeoutOverrides::default(),
        };

        let texts: Vec<_> = manifest
            .locators()
            .iter()
            .filter_map(|l| l.as_text().map(str::to_string))
            .collect();
        assert_eq!(texts, vec!["1.jpg", "2.png", "intro.mp4", "theme.mp3"]);
    }

    #[test]
    fn missing_video_and_music_are_filtered() {
        let manifest = Manifest {
            media: vec!["1.jpg".into(), "".into()],
            ..Manifest::default()
        };
        assert_eq!(manifest.locators().len(), 4);
        assert_eq!(manifest.asset_count(), 1);
        assert!(manifest.ambient_track().is_none());
    }

    #[test]
    fn parses_from_json_with_nulls() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"media": ["a.png", null, 7], "video": null, "music": "m.ogg",
                "timeouts": {"global_ms": 3000}}"#,
        )
        .expect("parse");

        assert_eq!(manifest.asset_count(), 3);
        assert_eq!(manifest.video, None);
        assert_eq!(
            manifest.ambient_track().map(|t| t.locator),
            Some("m.ogg".to_string())
        );
        let timeouts = manifest.timeouts.resolve();
        assert_eq!(timeouts.global, Duration::from_millis(3000));
        assert_eq!(timeouts.per_asset, Duration::from_millis(5000));
    }

    #[test]
    fn overlay_prefers_set_values() {
        let base = TimeoutOverrides {
            per_asset_ms: Some(1),
            global_ms: Some(2),
            settle_grace_ms: None,
        };
        let over = TimeoutOverrides {
            global_ms: Some(20),
            ..TimeoutOverrides::default()
        };

        let merged = base.overlay(over);
        assert_eq!(merged.per_asset_ms, Some(1));
        assert_eq!(merged.global_ms, Some(20));
        assert_eq!(merged.resolve().settle_grace, Duration::from_millis(400));
    }
}
