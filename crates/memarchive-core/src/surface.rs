//! Presentation collaborators: the visible surface and the bookmark.

use crate::error::SurfaceError;
use crate::event::StageEvent;
use crate::ids::SceneId;

/// Renders presentation effects (scenes, narrator box, overlays, dock).
pub trait Surface: Send + Sync {
    /// Applies one stage event.
    ///
    /// # Errors
    ///
    /// Returns `SurfaceError::MissingTarget` when the current view has no
    /// element for this effect; callers treat that as a skipped enhancement.
    fn apply(&self, event: &StageEvent) -> Result<(), SurfaceError>;
}

/// Restorable location naming the active scene.
pub trait Bookmark: Send + Sync {
    /// Raw location fragment at startup, without interpretation.
    fn current(&self) -> Option<String>;

    /// Replaces the current location with `scene`, without adding history.
    fn replace(&self, scene: SceneId);
}
