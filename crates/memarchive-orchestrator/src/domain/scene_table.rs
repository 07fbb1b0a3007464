//! The resolved scene dispatch table.
//!
//! Every link between a scene, its narration script, its rigs and escalation
//! eligibility lives here, checked once against the story at startup.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use memarchive_core::ids::{ContextKey, FragmentId, Rig, SceneId};
use memarchive_narration::domain::script::SequenceOptions;

use crate::config::{ConfigError, StoryConfig};

/// Narration dispatched on entering a scene or focusing a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationDispatch {
    pub key: ContextKey,
    pub options: SequenceOptions,
    pub settle: Duration,
}

#[derive(Debug, Clone, Default)]
struct SceneEntry {
    narration: Option<NarrationDispatch>,
    rigs: Vec<Rig>,
}

/// Scene → side effects, validated against the story.
#[derive(Debug, Clone)]
pub struct SceneTable {
    fragments: Vec<FragmentId>,
    entries: HashMap<SceneId, SceneEntry>,
    escalation_scene: SceneId,
}

impl SceneTable {
    /// Validates `story` and builds the table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a fragment is listed twice, a scene names a
    /// fragment outside the story or an unknown script, or the escalation
    /// scene is not part of the story.
    pub fn resolve(story: &StoryConfig) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for fragment in &story.fragments {
            if !seen.insert(*fragment) {
                return Err(ConfigError::DuplicateFragment(*fragment));
            }
        }

        let mut table = Self {
            fragments: story.fragments.clone(),
            entries: HashMap::with_capacity(story.scenes.len()),
            escalation_scene: story.escalation.scene,
        };
        if !table.knows(table.escalation_scene) {
            return Err(ConfigError::EscalationScene(table.escalation_scene));
        }

        for (&scene, spec) in &story.scenes {
            if !table.knows(scene) {
                return Err(ConfigError::UnknownFragment(scene));
            }
            let narration = match &spec.narration {
                Some(binding) if !story.scripts.contains(&binding.key) => {
                    return Err(ConfigError::UnknownNarration {
                        scene,
                        key: binding.key.clone(),
                    });
                }
                Some(binding) => Some(NarrationDispatch {
                    key: binding.key.clone(),
                    options: binding.options(),
                    settle: Duration::from_millis(binding.settle_ms),
                }),
                None => None,
            };
            table.entries.insert(
                scene,
                SceneEntry {
                    narration,
                    rigs: spec.rigs.clone(),
                },
            );
        }
        Ok(table)
    }

    /// The story's fragments, in order.
    #[must_use]
    pub fn fragments(&self) -> &[FragmentId] {
        &self.fragments
    }

    /// Whether `scene` exists in this story. Fragment scenes exist only for
    /// the listed fragments.
    #[must_use]
    pub fn knows(&self, scene: SceneId) -> bool {
        scene
            .fragment()
            .is_none_or(|fragment| self.fragments.contains(&fragment))
    }

    #[must_use]
    pub fn narration(&self, scene: SceneId) -> Option<&NarrationDispatch> {
        self.entries.get(&scene)?.narration.as_ref()
    }

    #[must_use]
    pub fn rigs(&self, scene: SceneId) -> &[Rig] {
        self.entries.get(&scene).map_or(&[], |entry| &entry.rigs)
    }

    #[must_use]
    pub fn escalation_scene(&self) -> SceneId {
        self.escalation_scene
    }

    #[must_use]
    pub fn is_escalation_scene(&self, scene: SceneId) -> bool {
        scene == self.escalation_scene
    }
}
