//! # Ambient Track
//!
//! The background music handle started once readiness is reached.
//!
//! The handle is owned explicitly: whoever runs the session creates it and
//! passes it to whatever starts playback. Nothing here is process-global, so
//! starting twice across screen transitions is answered by the handle's own
//! state.

use crate::primitives::DEFAULT_AMBIENT_VOLUME;
use serde::{Deserialize, Serialize};

/// Playback state of an ambient track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Stopped,
}

impl PlaybackState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
        }
    }
}

/// An explicitly owned background track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientTrack {
    /// Locator of the audio asset.
    pub locator: String,
    /// Restart at the end of the track.
    pub looping: bool,
    /// Volume in percent, 0..=100.
    pub volume_percent: u8,
    state: PlaybackState,
}

impl AmbientTrack {
    /// Create a looping track at the default volume.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            looping: true,
            volume_percent: DEFAULT_AMBIENT_VOLUME,
            state: PlaybackState::Idle,
        }
    }

    /// Start playback. Returns true if the track was not already playing.
    pub fn start(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Stop playback. Returns true if the track was playing.
    pub fn stop(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Stopped;
        true
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }
}
