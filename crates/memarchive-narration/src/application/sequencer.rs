//! The Narration Sequencer.
//!
//! At most one session runs at a time. Each session gets a fresh generation
//! number; cancelling a session removes its pending step from the queue and
//! forgets the generation, so a step that slips through still finds nothing
//! to act on.

use std::time::Duration;

use memarchive_core::event::Effect;
use memarchive_core::ids::ContextKey;
use memarchive_core::media::Playback;
use memarchive_core::schedule::{Context, TaskHandle};
use tracing::{debug, info, trace};

use crate::domain::script::{NarrationTable, NarrationTiming, SequenceOptions};
use crate::domain::session::{NarrationSession, NarrationTask, Phase};

#[derive(Debug, Clone, Copy)]
struct QueuedStart {
    ticket: u64,
    handle: TaskHandle,
}

/// Plays narration scripts on the single narrator surface.
#[derive(Debug)]
pub struct Narrator {
    scripts: NarrationTable,
    timing: NarrationTiming,
    session: Option<NarrationSession>,
    next_session: u64,
    queued: Option<QueuedStart>,
    next_ticket: u64,
    audio_enabled: bool,
}

impl Narrator {
    /// Creates an idle narrator over `scripts`.
    #[must_use]
    pub fn new(scripts: NarrationTable, timing: NarrationTiming) -> Self {
        Self {
            scripts,
            timing,
            session: None,
            next_session: 0,
            queued: None,
            next_ticket: 0,
            audio_enabled: true,
        }
    }

    /// The script table.
    #[must_use]
    pub fn scripts(&self) -> &NarrationTable {
        &self.scripts
    }

    /// The current or last session.
    #[must_use]
    pub fn session(&self) -> Option<&NarrationSession> {
        self.session.as_ref()
    }

    /// Whether a session is revealing, holding or in a gap.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(NarrationSession::is_running)
    }

    /// Whether a delayed start is waiting.
    #[must_use]
    pub fn has_queued_start(&self) -> bool {
        self.queued.is_some()
    }

    /// Whether narration voice cues are played.
    #[must_use]
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Starts the script for `key`, replacing whatever is playing.
    ///
    /// Unknown keys and empty scripts are ignored and leave the current
    /// session untouched.
    pub fn sequence<T>(&mut self, key: &ContextKey, options: SequenceOptions, cx: &mut Context<'_, T>)
    where
        T: From<NarrationTask>,
    {
        let Some(script) = self.scripts.get(key).filter(|s| !s.segments.is_empty()) else {
            debug!(key = %key, "no narration for context");
            return;
        };
        let cue = script.cue.clone();
        let first_speed = script.segments[0].speed(options);

        self.cancel_queued(cx);
        if let Some(previous) = self.session.take() {
            Self::tear_down(previous, true, cx);
        }

        self.next_session += 1;
        let bound = cue.filter(|_| self.audio_enabled);
        if let Some(cue) = &bound {
            cx.emit(Effect::PlayCue {
                cue: cue.clone(),
                playback: Playback::ONCE,
            });
        }
        info!(key = %key, session = self.next_session, "narration started");
        let mut session = NarrationSession::new(self.next_session, key.clone(), options, bound);
        begin_segment(&mut session, first_speed, cx);
        self.session = Some(session);
    }

    /// Starts the script for `key` after `delay`. A later `enqueue`,
    /// `sequence` or `stop` supersedes a start that has not fired yet.
    pub fn enqueue<T>(
        &mut self,
        key: &ContextKey,
        options: SequenceOptions,
        delay: Duration,
        cx: &mut Context<'_, T>,
    ) where
        T: From<NarrationTask>,
    {
        if delay.is_zero() {
            self.sequence(key, options, cx);
            return;
        }
        if !self.scripts.contains(key) {
            debug!(key = %key, "no narration for context");
            return;
        }
        self.cancel_queued(cx);
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let handle = cx.schedule(
            delay,
            NarrationTask::Start {
                ticket,
                key: key.clone(),
                options,
            },
        );
        debug!(key = %key, delay_ms = delay.as_millis(), "narration queued");
        self.queued = Some(QueuedStart { ticket, handle });
    }

    /// Cancels any queued start and the running session, then hides the
    /// narrator.
    pub fn stop<T>(&mut self, cx: &mut Context<'_, T>) {
        self.cancel_queued(cx);
        if let Some(session) = self.session.take() {
            Self::tear_down(session, false, cx);
        }
        cx.emit(Effect::NarratorHidden);
    }

    /// Turns narration voice cues on or off. Turning them off stops the cue
    /// bound to the running session.
    pub fn set_audio_enabled<T>(&mut self, enabled: bool, cx: &mut Context<'_, T>) {
        self.audio_enabled = enabled;
        if enabled {
            return;
        }
        if let Some(cue) = self.session.as_mut().and_then(|s| s.cue.take()) {
            cx.emit(Effect::StopCue { cue });
        }
    }

    /// Runs one delayed step. Steps from superseded generations do nothing.
    pub fn handle<T>(&mut self, task: NarrationTask, cx: &mut Context<'_, T>)
    where
        T: From<NarrationTask>,
    {
        match task {
            NarrationTask::Start { ticket, key, options } => {
                if self.queued.is_some_and(|q| q.ticket == ticket) {
                    self.queued = None;
                    self.sequence(&key, options, cx);
                } else {
                    trace!(ticket, "stale narration start");
                }
            }
            NarrationTask::Reveal { session } => {
                if let Some(live) = live_session(&mut self.session, session, Phase::Revealing) {
                    reveal(&self.scripts, self.timing, live, cx);
                }
            }
            NarrationTask::HoldElapsed { session } => {
                if let Some(live) = live_session(&mut self.session, session, Phase::Holding) {
                    let Some(segment) = self.scripts.get(&live.key).and_then(|s| s.segments.get(live.segment)) else {
                        return;
                    };
                    live.phase = Phase::Gap;
                    live.pending = Some(cx.schedule(
                        segment.gap(live.options),
                        NarrationTask::GapElapsed { session },
                    ));
                }
            }
            NarrationTask::GapElapsed { session } => {
                if let Some(live) = live_session(&mut self.session, session, Phase::Gap) {
                    live.segment += 1;
                    let next = self.scripts.get(&live.key).and_then(|s| s.segments.get(live.segment));
                    if let Some(segment) = next {
                        begin_segment(live, segment.speed(live.options), cx);
                    } else {
                        live.phase = Phase::Finished;
                        live.pending = None;
                        info!(key = %live.key, session, "narration finished");
                    }
                }
            }
        }
    }

    fn tear_down<T>(session: NarrationSession, clear_text: bool, cx: &mut Context<'_, T>) {
        if let Some(handle) = session.pending {
            cx.cancel(handle);
        }
        if let Some(cue) = session.cue {
            cx.emit(Effect::StopCue { cue });
        }
        if clear_text {
            cx.emit(Effect::NarratorText {
                text: String::new(),
            });
        }
        debug!(key = %session.key, session = session.id, "narration cancelled");
    }

    fn cancel_queued<T>(&mut self, cx: &mut Context<'_, T>) {
        if let Some(queued) = self.queued.take() {
            cx.cancel(queued.handle);
        }
    }
}

fn live_session(
    slot: &mut Option<NarrationSession>,
    session: u64,
    phase: Phase,
) -> Option<&mut NarrationSession> {
    let live = slot.as_mut().filter(|s| s.id == session && s.phase == phase);
    if live.is_none() {
        trace!(session, "stale narration step");
    }
    live
}

fn reveal<T>(
    scripts: &NarrationTable,
    timing: NarrationTiming,
    live: &mut NarrationSession,
    cx: &mut Context<'_, T>,
) where
    T: From<NarrationTask>,
{
    let Some(segment) = scripts.get(&live.key).and_then(|s| s.segments.get(live.segment)) else {
        return;
    };
    if live.revealed < segment.chars() {
        live.revealed += 1;
        cx.emit(Effect::NarratorText {
            text: segment.prefix(live.revealed).to_owned(),
        });
    }

    if live.revealed >= segment.chars() {
        cx.emit(Effect::NarratorIdle);
        live.phase = Phase::Holding;
        let hold = timing.hold(segment.chars(), segment.speed_ms(live.options));
        live.pending = Some(cx.schedule(hold, NarrationTask::HoldElapsed { session: live.id }));
    } else {
        live.pending = Some(cx.schedule(
            segment.speed(live.options),
            NarrationTask::Reveal { session: live.id },
        ));
    }
}

fn begin_segment<T>(session: &mut NarrationSession, speed: Duration, cx: &mut Context<'_, T>)
where
    T: From<NarrationTask>,
{
    session.revealed = 0;
    session.phase = Phase::Revealing;
    cx.emit(Effect::NarratorShown);
    cx.emit(Effect::NarratorText {
        text: String::new(),
    });
    session.pending = Some(cx.schedule(speed, NarrationTask::Reveal { session: session.id }));
}
