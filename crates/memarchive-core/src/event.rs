//! Stage events: presentation effects wrapped in traceable metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::ids::{CueId, FragmentId, Rig, SceneId, Theme};
use crate::media::Playback;

/// Metadata attached to every stage event.
#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for routing.
    pub event_type: String,
    /// Correlation ID of the control that caused this event.
    pub correlation_id: Uuid,
    /// Monotonically increasing position in the outbox.
    pub sequence_number: i64,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all stage events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

/// Per-fragment lock badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    /// The fragment.
    pub fragment: FragmentId,
    /// Whether it has been unlocked.
    pub unlocked: bool,
}

/// Everything the progress widgets need after a ledger change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Number of unlocked fragments.
    pub unlocked: usize,
    /// Number of fragments in the story.
    pub total: usize,
    /// `unlocked / total`, 1.0 when the story has no fragments.
    pub ratio: f64,
    /// One badge per fragment, in story order.
    pub badges: Vec<Badge>,
    /// Whether the finale action is available.
    pub finale_ready: bool,
    /// Glitch overlay strength, 1.0 with nothing unlocked down to 0.0.
    pub glitch_intensity: f64,
    /// Glitch animation period in milliseconds.
    pub glitch_period_ms: u32,
}

/// Copy shown on the escalation warning overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct WarningCopy {
    /// Overlay heading.
    pub title: String,
    /// Large central word.
    pub main: String,
    /// Sub line.
    pub sub: String,
}

/// Presentation-facing side effect recorded by a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// A scene became the single active scene.
    SceneShown { scene: SceneId },
    /// The restorable location now names this scene.
    BookmarkReplaced { scene: SceneId },
    /// A visual rig was enabled or disabled for the active scene.
    RigToggled { rig: Rig, enabled: bool },
    /// Progress widgets must be recomputed.
    ProgressChanged(ProgressSnapshot),
    /// The palette changed.
    ThemeApplied { theme: Theme },
    /// Terminal typing and click blips were turned on or off.
    TerminalSoundSet { enabled: bool },
    /// The narration surface became visible.
    NarratorShown,
    /// The narration surface now displays exactly this text.
    NarratorText { text: String },
    /// The current segment is fully revealed.
    NarratorIdle,
    /// The narration surface was hidden and cleared.
    NarratorHidden,
    /// The escalation warning overlay appeared.
    WarningShown(WarningCopy),
    /// The escalation warning overlay was removed.
    WarningHidden,
    /// The full-screen blackout appeared.
    BlackoutShown,
    /// The blackout was removed.
    BlackoutHidden,
    /// The terminal reveal media became visible.
    RevealShown,
    /// The reveal media was hidden.
    RevealHidden,
    /// The dock container became visible.
    DockShown,
    /// The dock container was hidden.
    DockHidden,
    /// A tab was appended to the dock.
    DockTabAdded { fragment: FragmentId },
    /// A tab was removed from the dock.
    DockTabRemoved { fragment: FragmentId },
    /// A tab became the single focused tab; its pane is the only one shown.
    DockFocused { fragment: FragmentId },
    /// Start a media cue.
    PlayCue { cue: CueId, playback: Playback },
    /// Stop a media cue and rewind it.
    StopCue { cue: CueId },
}

impl Effect {
    /// Returns the event type name for this effect.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SceneShown { .. } => "navigator.scene_shown",
            Self::BookmarkReplaced { .. } => "navigator.bookmark_replaced",
            Self::RigToggled { .. } => "navigator.rig_toggled",
            Self::ProgressChanged(_) => "progress.changed",
            Self::ThemeApplied { .. } => "preferences.theme_applied",
            Self::TerminalSoundSet { .. } => "preferences.terminal_sound_set",
            Self::NarratorShown => "narration.shown",
            Self::NarratorText { .. } => "narration.text",
            Self::NarratorIdle => "narration.idle",
            Self::NarratorHidden => "narration.hidden",
            Self::WarningShown(_) => "escalation.warning_shown",
            Self::WarningHidden => "escalation.warning_hidden",
            Self::BlackoutShown => "escalation.blackout_shown",
            Self::BlackoutHidden => "escalation.blackout_hidden",
            Self::RevealShown => "escalation.reveal_shown",
            Self::RevealHidden => "escalation.reveal_hidden",
            Self::DockShown => "dock.shown",
            Self::DockHidden => "dock.hidden",
            Self::DockTabAdded { .. } => "dock.tab_added",
            Self::DockTabRemoved { .. } => "dock.tab_removed",
            Self::DockFocused { .. } => "dock.focused",
            Self::PlayCue { .. } => "media.play",
            Self::StopCue { .. } => "media.stop",
        }
    }
}

/// Event envelope delivered to collaborators.
#[derive(Debug, Clone)]
pub struct StageEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// The effect to apply.
    pub effect: Effect,
}

impl DomainEvent for StageEvent {
    fn event_type(&self) -> &'static str {
        self.effect.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Derived Serialize into a Value cannot fail.
        serde_json::to_value(&self.effect).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

/// FIFO of stage events waiting to be flushed to collaborators.
pub struct Outbox {
    clock: Box<dyn Clock>,
    next_sequence: i64,
    pending: Vec<StageEvent>,
}

impl Outbox {
    /// Creates an empty outbox stamping events with `clock`.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            next_sequence: 1,
            pending: Vec::new(),
        }
    }

    /// Appends an effect caused by `correlation_id`.
    pub fn record(&mut self, correlation_id: Uuid, effect: Effect) {
        let event = StageEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: effect.event_type().to_owned(),
                correlation_id,
                sequence_number: self.next_sequence,
                occurred_at: self.clock.now(),
            },
            effect,
        };
        self.next_sequence += 1;
        self.pending.push(event);
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn pending(&self) -> &[StageEvent] {
        &self.pending
    }

    /// Removes and returns every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("next_sequence", &self.next_sequence)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
