//! User-facing controls.

use memarchive_core::command::Command;
use memarchive_core::ids::{FragmentId, SceneId};
use uuid::Uuid;

/// Explicit answer to the destructive-reset prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetConfirmation {
    Confirmed,
    Declined,
}

/// A control surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Activate a scene directly.
    Navigate(SceneId),
    /// Open a fragment tab in the dock, or focus it if already open.
    OpenFragment(FragmentId),
    /// Focus an open fragment tab.
    FocusFragment(FragmentId),
    /// Close a fragment tab.
    CloseFragment(FragmentId),
    /// Forget every unlocked fragment and return to the hub.
    ResetProgress(ResetConfirmation),
    /// Turn narration voice cues on or off.
    SetNarrationAudio(bool),
    /// Turn terminal typing and click blips on or off.
    SetTerminalSound(bool),
    /// Switch palette.
    ToggleTheme,
    /// Leave the intro for the home screen.
    FinishIntro,
    /// Enter the boot sequence.
    StartBoot,
    /// Boot sequence finished; enter the hub.
    FinishBoot,
}

impl Control {
    /// Control name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::OpenFragment(_) => "open_fragment",
            Self::FocusFragment(_) => "focus_fragment",
            Self::CloseFragment(_) => "close_fragment",
            Self::ResetProgress(_) => "reset_progress",
            Self::SetNarrationAudio(_) => "set_narration_audio",
            Self::SetTerminalSound(_) => "set_terminal_sound",
            Self::ToggleTheme => "toggle_theme",
            Self::FinishIntro => "finish_intro",
            Self::StartBoot => "start_boot",
            Self::FinishBoot => "finish_boot",
        }
    }
}

/// A control with its correlation ID.
#[derive(Debug, Clone)]
pub struct ControlCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// What the user asked for.
    pub control: Control,
}

impl ControlCommand {
    /// Wraps `control` under a fresh correlation ID.
    #[must_use]
    pub fn new(control: Control) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            control,
        }
    }
}

impl From<Control> for ControlCommand {
    fn from(control: Control) -> Self {
        Self::new(control)
    }
}

impl Command for ControlCommand {
    fn command_type(&self) -> &'static str {
        self.control.name()
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
