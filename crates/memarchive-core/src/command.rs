//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every user-facing control.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The control name (for logging).
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the control to every effect it causes,
    /// including effects of tasks it schedules.
    fn correlation_id(&self) -> Uuid;
}
