//! Bookmark kept as a one-line file.

use std::fs;
use std::path::PathBuf;

use memarchive_core::ids::SceneId;
use memarchive_core::surface::Bookmark;
use tracing::debug;

/// Stores the restorable location (`#hub`) in a file.
#[derive(Debug, Clone)]
pub struct FileBookmark {
    path: PathBuf,
}

impl FileBookmark {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Bookmark for FileBookmark {
    fn current(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let location = raw.trim();
        (!location.is_empty()).then(|| location.to_owned())
    }

    fn replace(&self, scene: SceneId) {
        if let Err(e) = fs::write(&self.path, format!("#{scene}\n")) {
            debug!(%scene, error = %e, "bookmark not saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_then_current_round_trips() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let bookmark = FileBookmark::new(dir.path().join("location"));
        let before = bookmark.current();

        // Act
        bookmark.replace(SceneId::Hub);

        // Assert
        assert_eq!(before, None);
        assert_eq!(bookmark.current().as_deref(), Some("#hub"));
    }
}
