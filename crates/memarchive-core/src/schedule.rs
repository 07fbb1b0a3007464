//! Cooperative single-threaded task queue on virtual time.
//!
//! Every delayed step (typing tick, narration hold, escalation stage) is a
//! task value in one queue ordered by deadline, then by scheduling order.
//! Scheduling returns a [`TaskHandle`]; cancelling the handle removes the
//! task so it can never fire. Owners additionally stamp task payloads with a
//! generation number and ignore stale ones when they do fire.

use std::collections::BTreeMap;
use std::time::Duration;

use uuid::Uuid;

use crate::event::{Effect, Outbox};

/// Invalidation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    due: Duration,
    seq: u64,
}

impl TaskHandle {
    /// Virtual time at which the task fires.
    #[must_use]
    pub const fn due(self) -> Duration {
        self.due
    }
}

/// A task whose deadline has been reached.
#[derive(Debug)]
pub struct Due<T> {
    /// Handle the task was scheduled under.
    pub handle: TaskHandle,
    /// Correlation ID of the control that scheduled it.
    pub correlation_id: Uuid,
    /// Task payload.
    pub task: T,
}

/// Virtual-time task queue.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), (Uuid, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty queue at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `task` to fire `delay` after now.
    pub fn schedule(&mut self, delay: Duration, correlation_id: Uuid, task: T) -> TaskHandle {
        let due = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), (correlation_id, task));
        TaskHandle { due, seq }
    }

    /// Invalidates a task. Returns `false` if it already fired or was
    /// already cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.queue.remove(&(handle.due, handle.seq)).is_some()
    }

    /// Whether the task behind `handle` is still waiting.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.contains_key(&(handle.due, handle.seq))
    }

    /// Deadline of the earliest waiting task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Number of waiting tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no task is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes the earliest task due at or before `until`, moving the clock
    /// to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Due<T>> {
        let entry = self.queue.first_entry()?;
        if entry.key().0 > until {
            return None;
        }
        let ((due, seq), (correlation_id, task)) = entry.remove_entry();
        self.now = self.now.max(due);
        Some(Due {
            handle: TaskHandle { due, seq },
            correlation_id,
            task,
        })
    }

    /// Moves the clock forward to `until` (never backwards).
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

/// What a component may touch during one turn of the loop: the shared
/// queue, the effect outbox, and the correlation of the current control.
pub struct Context<'a, T> {
    scheduler: &'a mut Scheduler<T>,
    outbox: &'a mut Outbox,
    correlation_id: Uuid,
}

impl<'a, T> Context<'a, T> {
    /// Bundles a queue and an outbox for one turn.
    pub fn new(scheduler: &'a mut Scheduler<T>, outbox: &'a mut Outbox, correlation_id: Uuid) -> Self {
        Self {
            scheduler,
            outbox,
            correlation_id,
        }
    }

    /// Correlation ID of the current turn.
    #[must_use]
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Records a presentation effect.
    pub fn emit(&mut self, effect: Effect) {
        self.outbox.record(self.correlation_id, effect);
    }

    /// Schedules a task carrying the current correlation.
    pub fn schedule(&mut self, delay: Duration, task: impl Into<T>) -> TaskHandle {
        self.scheduler
            .schedule(delay, self.correlation_id, task.into())
    }

    /// Cancels a previously scheduled task.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    /// Whether the task behind `handle` is still waiting.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.scheduler.is_pending(handle)
    }
}

impl<T> std::fmt::Debug for Context<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("now", &self.scheduler.now())
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_orders_by_deadline_then_insertion() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let cid = Uuid::new_v4();
        scheduler.schedule(ms(20), cid, "late");
        scheduler.schedule(ms(10), cid, "first");
        scheduler.schedule(ms(10), cid, "second");

        // Act
        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(ms(100)))
            .map(|due| due.task)
            .collect();

        // Assert
        assert_eq!(order, vec!["first", "second", "late"]);
        assert_eq!(scheduler.now(), ms(20));
    }

    #[test]
    fn test_pop_due_leaves_future_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(50), Uuid::new_v4(), 1);

        assert!(scheduler.pop_due(ms(49)).is_none());
        assert_eq!(scheduler.next_deadline(), Some(ms(50)));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(ms(5), Uuid::new_v4(), "stale");

        // Act
        let cancelled = scheduler.cancel(handle);

        // Assert
        assert!(cancelled);
        assert!(!scheduler.is_pending(handle));
        assert!(scheduler.pop_due(ms(1_000)).is_none());
        assert!(!scheduler.cancel(handle));
    }

    #[test]
    fn test_schedule_is_relative_to_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(ms(300));

        let handle = scheduler.schedule(ms(200), Uuid::new_v4(), ());

        assert_eq!(handle.due(), ms(500));
    }

    #[test]
    fn test_advance_to_never_moves_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance_to(ms(40));
        scheduler.advance_to(ms(10));

        assert_eq!(scheduler.now(), ms(40));
    }
}
