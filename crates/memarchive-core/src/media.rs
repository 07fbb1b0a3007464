//! Media deck abstraction for narration, warning and reveal cues.

use serde::{Deserialize, Serialize};

use crate::error::MediaError;
use crate::ids::CueId;

/// How a cue should be played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    /// Restart from the beginning when the asset ends.
    #[serde(default)]
    pub looped: bool,
    /// Volume in `[0.0, 1.0]`.
    #[serde(default = "full_volume")]
    pub volume: f32,
}

fn full_volume() -> f32 {
    1.0
}

impl Playback {
    /// Play once at full volume.
    pub const ONCE: Self = Self {
        looped: false,
        volume: 1.0,
    };

    /// Loop at the given volume.
    #[must_use]
    pub const fn looped(volume: f32) -> Self {
        Self {
            looped: true,
            volume,
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::ONCE
    }
}

/// Plays and stops named media assets.
///
/// Every call starts from the beginning of the asset; `stop` also rewinds.
/// Errors are reported for diagnostics only and never abort narration.
pub trait MediaDeck: Send + Sync {
    /// Starts playback of `cue`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` when the asset is missing or playback is refused.
    fn play(&self, cue: &CueId, playback: Playback) -> Result<(), MediaError>;

    /// Stops and rewinds `cue`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Missing` when the asset is unknown.
    fn stop(&self, cue: &CueId) -> Result<(), MediaError>;
}
