//! Test media decks — mock `MediaDeck` implementations for tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use memarchive_core::error::MediaError;
use memarchive_core::ids::CueId;
use memarchive_core::media::{MediaDeck, Playback};

/// A media call observed by [`RecordingMediaDeck`].
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    /// `play` was called.
    Play(CueId, Playback),
    /// `stop` was called.
    Stop(CueId),
}

/// A deck that records calls and tracks which cues are playing.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingMediaDeck {
    calls: Arc<Mutex<Vec<MediaCall>>>,
    playing: Arc<Mutex<BTreeSet<CueId>>>,
}

impl RecordingMediaDeck {
    /// Creates an idle deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Cues currently playing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn playing(&self) -> Vec<String> {
        self.playing
            .lock()
            .unwrap()
            .iter()
            .map(|cue| cue.as_str().to_owned())
            .collect()
    }
}

impl MediaDeck for RecordingMediaDeck {
    fn play(&self, cue: &CueId, playback: Playback) -> Result<(), MediaError> {
        self.calls
            .lock()
            .unwrap()
            .push(MediaCall::Play(cue.clone(), playback));
        self.playing.lock().unwrap().insert(cue.clone());
        Ok(())
    }

    fn stop(&self, cue: &CueId) -> Result<(), MediaError> {
        self.calls.lock().unwrap().push(MediaCall::Stop(cue.clone()));
        self.playing.lock().unwrap().remove(cue);
        Ok(())
    }
}

/// A deck that refuses every playback, as a browser does before the first
/// user gesture.
#[derive(Debug, Clone, Copy)]
pub struct RejectingMediaDeck;

impl MediaDeck for RejectingMediaDeck {
    fn play(&self, cue: &CueId, _playback: Playback) -> Result<(), MediaError> {
        Err(MediaError::Rejected {
            cue: cue.clone(),
            reason: "autoplay blocked".into(),
        })
    }

    fn stop(&self, cue: &CueId) -> Result<(), MediaError> {
        Err(MediaError::Missing(cue.clone()))
    }
}
