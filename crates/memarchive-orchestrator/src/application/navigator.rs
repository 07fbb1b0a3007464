//! The Scene Navigator.

use memarchive_core::event::Effect;
use memarchive_core::ids::{Rig, SceneId};
use tracing::{debug, info};

use crate::application::stage::Stage;
use crate::domain::scene_table::SceneTable;

/// Owns the single active scene.
#[derive(Debug)]
pub struct SceneNavigator {
    active: SceneId,
}

impl Default for SceneNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNavigator {
    /// Starts on the intro.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: SceneId::Intro,
        }
    }

    #[must_use]
    pub fn active(&self) -> SceneId {
        self.active
    }

    /// Resolves the cold-start scene from a bookmark such as `#hub`.
    ///
    /// Empty, `intro` and unrecognised bookmarks start on the intro.
    #[must_use]
    pub fn startup_scene(bookmark: Option<&str>, table: &SceneTable) -> SceneId {
        let raw = bookmark.unwrap_or_default().trim().trim_start_matches('#');
        if raw.is_empty() {
            return SceneId::Intro;
        }
        match raw.parse::<SceneId>() {
            Ok(scene) if table.knows(scene) => scene,
            Ok(scene) => {
                debug!(%scene, "bookmarked scene is not part of the story");
                SceneId::Intro
            }
            Err(e) => {
                debug!(error = %e, "ignoring unrecognised bookmark");
                SceneId::Intro
            }
        }
    }

    /// Makes `scene` the single active scene and fans out its side effects.
    /// Returns `false` for scenes outside the story.
    pub fn activate(&mut self, scene: SceneId, stage: &mut Stage<'_>) -> bool {
        if !stage.table.knows(scene) {
            debug!(%scene, "ignoring activation of unknown scene");
            return false;
        }

        stage.tear_down();

        let previous = std::mem::replace(&mut self.active, scene);
        stage.cx.emit(Effect::SceneShown { scene });

        if let Some(fragment) = scene.fragment() {
            stage
                .tracker
                .mark_unlocked(fragment, stage.store, &mut stage.cx);
        }

        stage.cx.emit(Effect::BookmarkReplaced { scene });

        let rigs = stage.table.rigs(scene);
        for rig in Rig::ALL {
            stage.cx.emit(Effect::RigToggled {
                rig,
                enabled: rigs.contains(&rig),
            });
        }

        stage.dispatch_narration(scene);
        stage.gate_escalation(scene);

        info!(from = %previous, to = %scene, "scene activated");
        true
    }
}
