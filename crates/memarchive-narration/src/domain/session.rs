//! One playing narration script, and the tasks that drive it.

use memarchive_core::ids::{ContextKey, CueId};
use memarchive_core::schedule::TaskHandle;

use super::script::SequenceOptions;

/// Where a session is within its current segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Characters are being appended.
    Revealing,
    /// The segment is fully shown and waiting out its hold.
    Holding,
    /// Waiting between two segments.
    Gap,
    /// All segments played; the last text stays visible.
    Finished,
}

/// Delayed steps of the narrator. Every step carries the generation it was
/// scheduled for; steps for any other generation are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationTask {
    /// A delayed start requested with `enqueue`.
    Start {
        ticket: u64,
        key: ContextKey,
        options: SequenceOptions,
    },
    /// Reveal the next character.
    Reveal { session: u64 },
    /// The hold of a fully shown segment elapsed.
    HoldElapsed { session: u64 },
    /// The gap after a segment elapsed.
    GapElapsed { session: u64 },
}

/// State of the script currently on the narrator surface.
#[derive(Debug, Clone)]
pub struct NarrationSession {
    pub(crate) id: u64,
    pub(crate) key: ContextKey,
    pub(crate) options: SequenceOptions,
    pub(crate) segment: usize,
    pub(crate) revealed: usize,
    pub(crate) phase: Phase,
    pub(crate) cue: Option<CueId>,
    pub(crate) pending: Option<TaskHandle>,
}

impl NarrationSession {
    pub(crate) fn new(id: u64, key: ContextKey, options: SequenceOptions, cue: Option<CueId>) -> Self {
        Self {
            id,
            key,
            options,
            segment: 0,
            revealed: 0,
            phase: Phase::Revealing,
            cue,
            pending: None,
        }
    }

    /// Generation number of this session.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Script being played.
    #[must_use]
    pub fn key(&self) -> &ContextKey {
        &self.key
    }

    /// Index of the current segment.
    #[must_use]
    pub fn segment_index(&self) -> usize {
        self.segment
    }

    /// Characters of the current segment shown so far.
    #[must_use]
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Voice cue still bound to the session, if any.
    #[must_use]
    pub fn cue(&self) -> Option<&CueId> {
        self.cue.as_ref()
    }

    /// Whether the session still has steps to run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Finished
    }
}
