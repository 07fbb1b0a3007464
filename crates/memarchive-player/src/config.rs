//! Player configuration, read from the environment.

use std::path::PathBuf;

use memarchive_orchestrator::config::StoryConfig;

use crate::error::AppError;

/// Directory holding the persisted records and the bookmark.
pub const STATE_DIR_VAR: &str = "MEMARCHIVE_STATE_DIR";
/// Optional path to a story document replacing the built-in one.
pub const STORY_VAR: &str = "MEMARCHIVE_STORY";

const DEFAULT_STATE_DIR: &str = ".memarchive";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub state_dir: PathBuf,
    pub story: Option<PathBuf>,
}

impl PlayerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but blank.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let state_dir = match lookup(STATE_DIR_VAR) {
            Some(dir) if dir.trim().is_empty() => {
                return Err(AppError::Config(format!("{STATE_DIR_VAR} must not be blank")));
            }
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(DEFAULT_STATE_DIR),
        };
        let story = match lookup(STORY_VAR) {
            Some(path) if path.trim().is_empty() => {
                return Err(AppError::Config(format!("{STORY_VAR} must not be blank")));
            }
            path => path.map(PathBuf::from),
        };
        Ok(Self { state_dir, story })
    }

    /// Loads the configured story, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the story file cannot be read and
    /// `AppError::Story` if it does not parse.
    pub fn load_story(&self) -> Result<StoryConfig, AppError> {
        let story = match &self.story {
            Some(path) => StoryConfig::from_yaml(&std::fs::read_to_string(path)?)?,
            None => StoryConfig::builtin()?,
        };
        Ok(story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PlayerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.state_dir, PathBuf::from(".memarchive"));
        assert_eq!(config.story, None);
    }

    #[test]
    fn test_reads_both_variables() {
        let config = PlayerConfig::from_lookup(lookup(&[
            (STATE_DIR_VAR, "/tmp/archive"),
            (STORY_VAR, "story.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.state_dir, PathBuf::from("/tmp/archive"));
        assert_eq!(config.story, Some(PathBuf::from("story.yaml")));
    }

    #[test]
    fn test_blank_state_dir_is_rejected() {
        let result = PlayerConfig::from_lookup(lookup(&[(STATE_DIR_VAR, "  ")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_story_file_is_io_error() {
        let config = PlayerConfig::from_lookup(lookup(&[(STORY_VAR, "/nonexistent/story.yaml")])).unwrap();

        assert!(matches!(config.load_story(), Err(AppError::Io(_))));
    }

    #[test]
    fn test_builtin_story_loads() {
        let config = PlayerConfig::from_lookup(lookup(&[])).unwrap();

        let story = config.load_story().unwrap();

        assert_eq!(story.fragments.len(), 3);
    }
}
