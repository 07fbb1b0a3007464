//! Story configuration.
//!
//! The story is a YAML document listing the fragments, storage keys, the
//! per-scene dispatch table, escalation settings, narration timing and the
//! narration scripts. It is validated once, when the scene table is
//! resolved.

use std::collections::HashMap;

use memarchive_core::ids::{ContextKey, FragmentId, Rig, SceneId};
use memarchive_escalation::domain::config::EscalationConfig;
use memarchive_narration::domain::script::{NarrationTable, NarrationTiming, SequenceOptions};
use memarchive_progress::domain::keys::StorageKeys;
use serde::Deserialize;
use thiserror::Error;

/// The story shipped with the crate.
pub const BUILTIN_STORY: &str = include_str!("../content/story.yaml");

/// Story loading and validation failures. Only raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not a valid story.
    #[error("invalid story document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A fragment is listed more than once.
    #[error("fragment {0} is listed more than once")]
    DuplicateFragment(FragmentId),

    /// A scene refers to a fragment the story does not list.
    #[error("scene {0} refers to a fragment outside the story")]
    UnknownFragment(SceneId),

    /// A scene refers to a narration script that does not exist.
    #[error("scene {scene} refers to unknown narration {key}")]
    UnknownNarration {
        /// Scene whose binding is broken.
        scene: SceneId,
        /// Missing script key.
        key: ContextKey,
    },

    /// The escalation scene is not part of the story.
    #[error("escalation scene {0} is not part of the story")]
    EscalationScene(SceneId),
}

/// The full story document.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    /// Unlockable fragments, in story order.
    pub fragments: Vec<FragmentId>,
    #[serde(default)]
    pub storage: StorageKeys,
    pub escalation: EscalationSection,
    #[serde(default)]
    pub narration_timing: NarrationTiming,
    #[serde(default)]
    pub scenes: HashMap<SceneId, SceneSpec>,
    #[serde(default)]
    pub scripts: NarrationTable,
}

impl StoryConfig {
    /// Parses a story document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document does not match the story
    /// schema.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses the built-in story.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the bundled document is malformed.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_STORY)
    }
}

/// Which scene escalates, and how.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationSection {
    /// The escalation-eligible scene. When it is a fragment scene, focusing
    /// that fragment in the dock is escalation-eligible too.
    pub scene: SceneId,
    #[serde(default)]
    pub timer: EscalationConfig,
}

/// Side effects dispatched when a scene is entered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneSpec {
    pub narration: Option<NarrationBinding>,
    /// Rigs enabled for this scene; every other rig is disabled.
    pub rigs: Vec<Rig>,
}

/// Narration started when a scene is entered.
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationBinding {
    pub key: ContextKey,
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
    /// Delay between entering the scene and starting the narration.
    #[serde(default)]
    pub settle_ms: u64,
}

fn default_speed_ms() -> u64 {
    SequenceOptions::default().speed_ms
}

fn default_gap_ms() -> u64 {
    SequenceOptions::default().gap_ms
}

impl NarrationBinding {
    /// Reveal options for the bound script.
    #[must_use]
    pub fn options(&self) -> SequenceOptions {
        SequenceOptions::new(self.speed_ms, self.gap_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_story_parses() {
        // Act
        let story = StoryConfig::builtin().unwrap();

        // Assert
        assert_eq!(story.fragments.len(), 3);
        assert_eq!(
            story.escalation.scene,
            SceneId::Fragment(FragmentId::new(3).unwrap())
        );
        assert_eq!(story.escalation.timer.warning_delay_ms, 15_000);
        let hub = &story.scenes[&SceneId::Hub];
        let narration = hub.narration.as_ref().unwrap();
        assert_eq!(narration.key, ContextKey::new("hub_intro"));
        assert_eq!(narration.settle_ms, 800);
        assert_eq!(narration.options(), SequenceOptions::new(38, 1200));
        assert!(story.scripts.contains(&ContextKey::new("frag3_open")));
    }

    #[test]
    fn test_minimal_story_uses_defaults() {
        let yaml = "fragments: [fragment-1]\nescalation:\n  scene: fragment-1\n";

        let story = StoryConfig::from_yaml(yaml).unwrap();

        assert_eq!(story.storage, StorageKeys::default());
        assert_eq!(story.escalation.timer, EscalationConfig::default());
        assert!(story.scenes.is_empty());
        assert!(story.scripts.is_empty());
    }

    #[test]
    fn test_unknown_scene_name_is_rejected() {
        let yaml = "fragments: []\nescalation:\n  scene: hub\nscenes:\n  attic: {}\n";

        let result = StoryConfig::from_yaml(yaml);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
