//! Escalation states and the tasks that move between them.

use std::fmt;

/// Where the escalation chain stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscalationState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// The warning is scheduled but not yet visible.
    Armed,
    /// The warning overlay and cues are live; the blackout is scheduled.
    Warned,
    /// Blackout shown. Terminal until a full reset.
    Fired,
}

impl fmt::Display for EscalationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Warned => "warned",
            Self::Fired => "fired",
        })
    }
}

/// Scheduled stage of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationStep {
    Warn,
    Fire,
    Reveal,
}

/// A delayed stage, stamped with the epoch it was scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationTask {
    pub epoch: u64,
    pub step: EscalationStep,
}
