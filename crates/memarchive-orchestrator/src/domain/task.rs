//! The shared task type of the archive's scheduler.

use memarchive_escalation::domain::state::EscalationTask;
use memarchive_narration::domain::session::NarrationTask;

/// Every delayed step the archive can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Narration(NarrationTask),
    Escalation(EscalationTask),
}

impl From<NarrationTask> for Task {
    fn from(task: NarrationTask) -> Self {
        Self::Narration(task)
    }
}

impl From<EscalationTask> for Task {
    fn from(task: EscalationTask) -> Self {
        Self::Escalation(task)
    }
}
