//! Test surfaces — recording `Surface` and `Bookmark` implementations.

use std::sync::{Arc, Mutex};

use memarchive_core::error::SurfaceError;
use memarchive_core::event::{Effect, StageEvent};
use memarchive_core::ids::SceneId;
use memarchive_core::surface::{Bookmark, Surface};

/// A surface that records every applied event. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    events: Arc<Mutex<Vec<StageEvent>>>,
}

impl RecordingSurface {
    /// Creates an empty recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every applied event.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Snapshot of every applied effect.
    #[must_use]
    pub fn effects(&self) -> Vec<Effect> {
        self.events().into_iter().map(|e| e.effect).collect()
    }

    /// The text currently displayed by the narrator box, replaying the log.
    #[must_use]
    pub fn narrator_text(&self) -> Option<String> {
        let mut text = None;
        for effect in self.effects() {
            match effect {
                Effect::NarratorText { text: t } => text = Some(t),
                Effect::NarratorHidden => text = None,
                _ => {}
            }
        }
        text
    }

    /// Forgets everything recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Surface for RecordingSurface {
    fn apply(&self, event: &StageEvent) -> Result<(), SurfaceError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A surface with no elements at all: every effect misses its target.
#[derive(Debug, Clone, Copy)]
pub struct TargetlessSurface;

impl Surface for TargetlessSurface {
    fn apply(&self, _event: &StageEvent) -> Result<(), SurfaceError> {
        Err(SurfaceError::MissingTarget("view"))
    }
}

/// An in-memory bookmark. Clones share the location.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookmark {
    location: Arc<Mutex<Option<String>>>,
    replaced: Arc<Mutex<Vec<SceneId>>>,
}

impl MemoryBookmark {
    /// Creates an empty bookmark.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bookmark pointing at a raw location.
    #[must_use]
    pub fn at(location: &str) -> Self {
        let bookmark = Self::new();
        *bookmark.location.lock().unwrap() = Some(location.to_owned());
        bookmark
    }

    /// Every scene written, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn history(&self) -> Vec<SceneId> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Bookmark for MemoryBookmark {
    fn current(&self) -> Option<String> {
        self.location.lock().unwrap().clone()
    }

    fn replace(&self, scene: SceneId) {
        *self.location.lock().unwrap() = Some(format!("#{scene}"));
        self.replaced.lock().unwrap().push(scene);
    }
}
