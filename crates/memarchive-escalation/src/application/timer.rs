//! The Escalation Timer.

use std::time::Duration;

use memarchive_core::event::Effect;
use memarchive_core::media::Playback;
use memarchive_core::schedule::{Context, TaskHandle};
use tracing::{debug, info, trace};

use crate::domain::config::EscalationConfig;
use crate::domain::state::{EscalationState, EscalationStep, EscalationTask};

/// Owns the escalation state and its single pending stage.
///
/// Every transition back to `Idle` bumps the epoch, so a stage scheduled
/// before the transition is ignored even if it was already popped.
#[derive(Debug)]
pub struct EscalationTimer {
    config: EscalationConfig,
    state: EscalationState,
    epoch: u64,
    pending: Option<TaskHandle>,
}

impl EscalationTimer {
    /// An idle timer with the given stage delays.
    #[must_use]
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            state: EscalationState::Idle,
            epoch: 0,
            pending: None,
        }
    }

    /// Current stage of the escalation.
    #[must_use]
    pub fn state(&self) -> EscalationState {
        self.state
    }

    /// Stage delays this timer was built with.
    #[must_use]
    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    /// Schedules the warning. Only valid from `Idle`; returns whether the
    /// timer was armed.
    pub fn arm<T>(&mut self, cx: &mut Context<'_, T>) -> bool
    where
        T: From<EscalationTask>,
    {
        if self.state != EscalationState::Idle {
            debug!(state = %self.state, "escalation already engaged; not arming");
            return false;
        }
        self.schedule(EscalationStep::Warn, self.config.warning_delay(), cx);
        self.state = EscalationState::Armed;
        info!(delay_ms = self.config.warning_delay_ms, "escalation armed");
        true
    }

    /// Cancels a scheduled warning. A visible escalation is left alone;
    /// returns whether the timer was disarmed.
    pub fn disarm<T>(&mut self, cx: &mut Context<'_, T>) -> bool {
        match self.state {
            EscalationState::Idle => false,
            EscalationState::Armed => {
                self.cancel_pending(cx);
                self.state = EscalationState::Idle;
                info!("escalation disarmed");
                true
            }
            EscalationState::Warned | EscalationState::Fired => {
                debug!(state = %self.state, "escalation visible; not disarming");
                false
            }
        }
    }

    /// Returns to `Idle` from any state and takes down every cue and overlay
    /// the chain may have shown.
    pub fn full_reset<T>(&mut self, cx: &mut Context<'_, T>) {
        self.cancel_pending(cx);
        let previous = self.state;
        self.state = EscalationState::Idle;
        self.stop_warning(cx);
        cx.emit(Effect::BlackoutHidden);
        cx.emit(Effect::StopCue {
            cue: self.config.cues.reveal.clone(),
        });
        cx.emit(Effect::RevealHidden);
        info!(from = %previous, "escalation reset");
    }

    /// Runs a scheduled stage. Stages from an earlier epoch, or that do not
    /// follow the current state, are ignored.
    pub fn handle<T>(&mut self, task: EscalationTask, cx: &mut Context<'_, T>)
    where
        T: From<EscalationTask>,
    {
        if task.epoch != self.epoch {
            trace!(epoch = task.epoch, current = self.epoch, "stale escalation stage");
            return;
        }
        self.pending = None;

        match (task.step, self.state) {
            (EscalationStep::Warn, EscalationState::Armed) => {
                self.state = EscalationState::Warned;
                cx.emit(Effect::WarningShown(self.config.copy.clone()));
                for (cue, playback) in self.config.cues.warning() {
                    cx.emit(Effect::PlayCue { cue, playback });
                }
                self.schedule(EscalationStep::Fire, self.config.blackout_delay(), cx);
                info!("escalation warned");
            }
            (EscalationStep::Fire, EscalationState::Warned) => {
                self.state = EscalationState::Fired;
                self.stop_warning(cx);
                cx.emit(Effect::BlackoutShown);
                self.schedule(EscalationStep::Reveal, self.config.reveal_delay(), cx);
                info!("escalation fired");
            }
            (EscalationStep::Reveal, EscalationState::Fired) => {
                cx.emit(Effect::RevealShown);
                cx.emit(Effect::PlayCue {
                    cue: self.config.cues.reveal.clone(),
                    playback: Playback::ONCE,
                });
                debug!("escalation reveal started");
            }
            (step, state) => {
                trace!(?step, %state, "escalation stage out of order");
            }
        }
    }

    fn schedule<T>(&mut self, step: EscalationStep, delay: Duration, cx: &mut Context<'_, T>)
    where
        T: From<EscalationTask>,
    {
        let task = EscalationTask {
            epoch: self.epoch,
            step,
        };
        self.pending = Some(cx.schedule(delay, task));
    }

    fn cancel_pending<T>(&mut self, cx: &mut Context<'_, T>) {
        if let Some(handle) = self.pending.take() {
            cx.cancel(handle);
        }
        self.epoch += 1;
    }

    fn stop_warning<T>(&self, cx: &mut Context<'_, T>) {
        for (cue, _) in self.config.cues.warning() {
            cx.emit(Effect::StopCue { cue });
        }
        cx.emit(Effect::WarningHidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memarchive_core::event::Outbox;
    use memarchive_core::ids::CueId;
    use memarchive_core::schedule::Scheduler;
    use memarchive_test_support::FixedClock;
    use uuid::Uuid;

    struct Harness {
        timer: EscalationTimer,
        scheduler: Scheduler<EscalationTask>,
        outbox: Outbox,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                timer: EscalationTimer::new(EscalationConfig::default()),
                scheduler: Scheduler::new(),
                outbox: Outbox::new(Box::new(FixedClock::standard())),
            }
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut EscalationTimer, &mut Context<'_, EscalationTask>) -> R) -> R {
            let mut cx = Context::new(&mut self.scheduler, &mut self.outbox, Uuid::new_v4());
            f(&mut self.timer, &mut cx)
        }

        fn arm(&mut self) -> bool {
            self.with(|t, cx| t.arm(cx))
        }

        fn disarm(&mut self) -> bool {
            self.with(|t, cx| t.disarm(cx))
        }

        fn advance(&mut self, ms: u64) -> Vec<EscalationState> {
            let until = self.scheduler.now() + Duration::from_millis(ms);
            let mut seen = Vec::new();
            while let Some(due) = self.scheduler.pop_due(until) {
                let mut cx = Context::new(&mut self.scheduler, &mut self.outbox, due.correlation_id);
                self.timer.handle(due.task, &mut cx);
                seen.push(self.timer.state());
            }
            self.scheduler.advance_to(until);
            seen
        }

        fn effects(&mut self) -> Vec<Effect> {
            self.outbox.drain().into_iter().map(|e| e.effect).collect()
        }
    }

    #[test]
    fn test_armed_timer_warns_then_fires_then_reveals() {
        // Arrange
        let mut h = Harness::new();

        // Act
        assert!(h.arm());
        h.advance(14_999);
        let before = h.timer.state();
        h.advance(1);
        let warned = h.effects();
        h.advance(8_000);
        let fired = h.effects();
        h.advance(600);
        let revealed = h.effects();

        // Assert
        assert_eq!(before, EscalationState::Armed);
        assert_eq!(
            warned[0],
            Effect::WarningShown(EscalationConfig::default().copy)
        );
        assert_eq!(
            warned[1],
            Effect::PlayCue {
                cue: CueId::new("alert_sfx"),
                playback: Playback::looped(0.65)
            }
        );
        assert_eq!(warned.len(), 4);
        assert_eq!(fired.len(), 5);
        assert_eq!(fired[3], Effect::WarningHidden);
        assert_eq!(fired[4], Effect::BlackoutShown);
        assert_eq!(
            revealed,
            vec![
                Effect::RevealShown,
                Effect::PlayCue {
                    cue: CueId::new("trailer"),
                    playback: Playback::ONCE
                }
            ]
        );
        assert_eq!(h.timer.state(), EscalationState::Fired);
        assert!(h.scheduler.is_empty());
    }

    #[test]
    fn test_arm_while_warned_changes_nothing() {
        // Arrange
        let mut h = Harness::new();
        h.arm();
        h.advance(15_000);
        assert_eq!(h.timer.state(), EscalationState::Warned);
        let pending_before = h.scheduler.len();

        // Act
        let armed = h.arm();

        // Assert
        assert!(!armed);
        assert_eq!(h.timer.state(), EscalationState::Warned);
        assert_eq!(h.scheduler.len(), pending_before);
    }

    #[test]
    fn test_disarm_before_warning_cancels_chain() {
        let mut h = Harness::new();
        h.arm();
        h.advance(10_000);

        assert!(h.disarm());
        let later = h.advance(60_000);

        assert_eq!(h.timer.state(), EscalationState::Idle);
        assert!(later.is_empty());
        assert!(h.effects().is_empty());
    }

    #[test]
    fn test_disarm_once_warned_or_fired_is_refused() {
        // Arrange
        let mut h = Harness::new();
        h.arm();
        h.advance(15_000);

        // Act
        let from_warned = h.disarm();
        h.advance(8_000);
        let from_fired = h.disarm();
        let rearmed = h.arm();

        // Assert
        assert!(!from_warned);
        assert!(!from_fired);
        assert!(!rearmed);
        assert_eq!(h.timer.state(), EscalationState::Fired);
    }

    #[test]
    fn test_full_reset_from_fired_allows_rearming() {
        // Arrange
        let mut h = Harness::new();
        h.arm();
        h.advance(23_000);
        h.effects();

        // Act
        h.with(|t, cx| t.full_reset(cx));
        let cleanup = h.effects();
        let rearmed = h.arm();

        // Assert
        assert!(cleanup.contains(&Effect::BlackoutHidden));
        assert!(cleanup.contains(&Effect::RevealHidden));
        assert!(cleanup.contains(&Effect::WarningHidden));
        assert!(rearmed);
        assert_eq!(h.scheduler.len(), 1);
    }

    #[test]
    fn test_stage_from_previous_epoch_is_ignored() {
        let mut h = Harness::new();
        h.arm();
        h.disarm();
        h.arm();

        h.with(|t, cx| {
            t.handle(
                EscalationTask {
                    epoch: 0,
                    step: EscalationStep::Warn,
                },
                cx,
            );
        });

        assert_eq!(h.timer.state(), EscalationState::Armed);
        assert!(h.effects().is_empty());
    }

    #[test]
    fn test_fired_is_only_reached_through_warned() {
        // Arrange
        let mut h = Harness::new();
        let mut seed: u32 = 0x2089_2049;
        let mut trail = vec![EscalationState::Idle];

        // Act
        for _ in 0..400 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 5 {
                0 | 1 => {
                    h.arm();
                }
                2 => {
                    h.disarm();
                }
                3 => h.with(|t, cx| t.full_reset(cx)),
                _ => {}
            }
            trail.push(h.timer.state());
            trail.extend(h.advance(u64::from(seed % 9_000)));
            trail.push(h.timer.state());
        }

        // Assert
        for pair in trail.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if to == EscalationState::Fired && from != EscalationState::Fired {
                assert_eq!(from, EscalationState::Warned);
            }
            if to == EscalationState::Warned && from != EscalationState::Warned {
                assert_eq!(from, EscalationState::Armed);
            }
        }
    }
}
