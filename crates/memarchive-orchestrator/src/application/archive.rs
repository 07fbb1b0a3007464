//! The archive facade.
//!
//! Owns every component, the scheduler and the effect outbox. Each control
//! and each scheduler advance runs to completion, then the recorded effects
//! are flushed to the collaborators in order.

use std::time::Duration;

use memarchive_core::clock::Clock;
use memarchive_core::command::Command;
use memarchive_core::event::{DomainEvent, Effect, Outbox, ProgressSnapshot, StageEvent};
use memarchive_core::ids::{SceneId, Theme};
use memarchive_core::media::MediaDeck;
use memarchive_core::schedule::Scheduler;
use memarchive_core::store::KeyValueStore;
use memarchive_core::surface::{Bookmark, Surface};
use memarchive_escalation::domain::state::EscalationState;
use memarchive_narration::domain::session::NarrationSession;
use memarchive_progress::application::tracker::Persistence;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use crate::application::multiplexer::DockMultiplexer;
use crate::application::navigator::SceneNavigator;
use crate::application::stage::Components;
use crate::config::{ConfigError, StoryConfig};
use crate::domain::commands::{Control, ControlCommand, ResetConfirmation};
use crate::domain::dock::Dock;
use crate::domain::task::Task;

/// External collaborators the archive drives.
pub struct Ports {
    /// Persistent records: progress, palette and boot flag.
    pub store: Box<dyn KeyValueStore>,
    /// Receives every effect that is not audio or the bookmark.
    pub surface: Box<dyn Surface>,
    /// Plays and stops audio and video cues.
    pub media: Box<dyn MediaDeck>,
    /// Location that survives a restart.
    pub bookmark: Box<dyn Bookmark>,
    /// Stamps event metadata.
    pub clock: Box<dyn Clock>,
}

/// The orchestration core behind one player.
pub struct Archive {
    components: Components,
    navigator: SceneNavigator,
    dock: DockMultiplexer,
    scheduler: Scheduler<Task>,
    outbox: Outbox,
    store: Box<dyn KeyValueStore>,
    surface: Box<dyn Surface>,
    media: Box<dyn MediaDeck>,
    bookmark: Box<dyn Bookmark>,
}

impl Archive {
    /// Resolves `story` and loads persisted state through `ports.store`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the story does not resolve.
    pub fn new(story: &StoryConfig, ports: Ports) -> Result<Self, ConfigError> {
        let components = Components::load(story, ports.store.as_ref())?;
        Ok(Self {
            components,
            navigator: SceneNavigator::new(),
            dock: DockMultiplexer::new(),
            scheduler: Scheduler::new(),
            outbox: Outbox::new(ports.clock),
            store: ports.store,
            surface: ports.surface,
            media: ports.media,
            bookmark: ports.bookmark,
        })
    }

    /// Publishes the persisted palette and progress, then enters the scene
    /// named by the bookmark (or the intro).
    pub fn start(&mut self) -> SceneId {
        let bookmark = self.bookmark.current();
        let scene = SceneNavigator::startup_scene(bookmark.as_deref(), &self.components.table);

        let mut stage = self.components.stage(
            &mut self.scheduler,
            &mut self.outbox,
            self.store.as_ref(),
            Uuid::new_v4(),
        );
        stage.preferences.publish_theme(&mut stage.cx);
        stage.tracker.publish(&mut stage.cx);
        self.navigator.activate(scene, &mut stage);

        info!(%scene, "archive started");
        self.flush();
        scene
    }

    /// Applies one user control.
    #[instrument(
        skip(self, command),
        fields(command_type = command.command_type(), correlation_id = %command.correlation_id())
    )]
    pub fn handle(&mut self, command: &ControlCommand) {
        let mut stage = self.components.stage(
            &mut self.scheduler,
            &mut self.outbox,
            self.store.as_ref(),
            command.correlation_id(),
        );

        match command.control {
            Control::Navigate(scene) => {
                self.navigator.activate(scene, &mut stage);
            }
            Control::OpenFragment(fragment) => {
                self.dock.open(fragment, &mut stage);
            }
            Control::FocusFragment(fragment) => {
                self.dock.focus(fragment, &mut stage);
            }
            Control::CloseFragment(fragment) => {
                self.dock.close(fragment, &mut stage);
            }
            Control::ResetProgress(ResetConfirmation::Confirmed) => {
                stage.tracker.reset_all(stage.store, &mut stage.cx);
                stage.escalation.full_reset(&mut stage.cx);
                stage.narrator.stop(&mut stage.cx);
                self.dock.close_all(&mut stage);
                self.navigator.activate(SceneId::Hub, &mut stage);
                info!("progress reset");
            }
            Control::ResetProgress(ResetConfirmation::Declined) => {
                info!("progress reset declined");
            }
            Control::SetNarrationAudio(enabled) => {
                stage.narrator.set_audio_enabled(enabled, &mut stage.cx);
                info!(enabled, "narration audio toggled");
            }
            Control::SetTerminalSound(enabled) => {
                stage.preferences.set_terminal_sound(enabled, &mut stage.cx);
            }
            Control::ToggleTheme => {
                stage.preferences.toggle_theme(stage.store, &mut stage.cx);
            }
            Control::FinishIntro => {
                self.navigator.activate(SceneId::Home, &mut stage);
            }
            Control::StartBoot => {
                let next = if stage.preferences.booted() {
                    SceneId::Hub
                } else {
                    SceneId::Boot
                };
                self.navigator.activate(next, &mut stage);
            }
            Control::FinishBoot => {
                stage.preferences.mark_booted(stage.store);
                self.navigator.activate(SceneId::Hub, &mut stage);
            }
        }

        self.flush();
    }

    /// Runs every task due within `by` from now.
    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.scheduler.now().saturating_add(by));
    }

    /// Runs every task due at or before `until`, including tasks scheduled
    /// along the way, then moves the clock to `until`.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(due) = self.scheduler.pop_due(until) {
            let mut stage = self.components.stage(
                &mut self.scheduler,
                &mut self.outbox,
                self.store.as_ref(),
                due.correlation_id,
            );
            stage.run(due.task);
        }
        self.scheduler.advance_to(until);
        self.flush();
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Deadline of the next scheduled step.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Number of scheduled steps not yet run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Scene currently shown.
    #[must_use]
    pub fn active_scene(&self) -> SceneId {
        self.navigator.active()
    }

    /// Open fragment tabs.
    #[must_use]
    pub fn dock(&self) -> &Dock {
        self.dock.dock()
    }

    /// Unlocked count out of the story total.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.components.tracker.snapshot()
    }

    /// Whether every fragment is unlocked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.components.tracker.is_complete()
    }

    /// Whether progress writes are reaching the store.
    #[must_use]
    pub fn persistence(&self) -> Persistence {
        self.components.tracker.persistence()
    }

    /// Current escalation stage.
    #[must_use]
    pub fn escalation_state(&self) -> EscalationState {
        self.components.escalation.state()
    }

    /// The running or finished narration session, if any.
    #[must_use]
    pub fn narration(&self) -> Option<&NarrationSession> {
        self.components.narrator.session()
    }

    /// Whether narration voice cues are enabled.
    #[must_use]
    pub fn narration_audio(&self) -> bool {
        self.components.narrator.audio_enabled()
    }

    /// Current palette.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.components.preferences.theme()
    }

    /// Whether terminal blips are on.
    #[must_use]
    pub fn terminal_sound(&self) -> bool {
        self.components.preferences.terminal_sound()
    }

    fn flush(&mut self) {
        for event in self.outbox.drain() {
            self.deliver(&event);
        }
    }

    fn deliver(&self, event: &StageEvent) {
        trace!(
            event_type = event.event_type(),
            sequence = event.metadata().sequence_number,
            correlation_id = %event.metadata().correlation_id,
            payload = %event.to_payload(),
            "delivering effect"
        );
        match &event.effect {
            Effect::PlayCue { cue, playback } => {
                if let Err(e) = self.media.play(cue, *playback) {
                    debug!(%cue, error = %e, "cue playback skipped");
                }
            }
            Effect::StopCue { cue } => {
                if let Err(e) = self.media.stop(cue) {
                    debug!(%cue, error = %e, "cue stop skipped");
                }
            }
            Effect::BookmarkReplaced { scene } => self.bookmark.replace(*scene),
            _ => {
                if let Err(e) = self.surface.apply(event) {
                    debug!(
                        event_type = %event.metadata.event_type,
                        error = %e,
                        "surface skipped effect"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("now", &self.scheduler.now())
            .field("active", &self.navigator.active())
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memarchive_core::ids::{CueId, FragmentId};
    use memarchive_core::media::Playback;
    use memarchive_test_support::{
        FixedClock, MediaCall, MemoryBookmark, MemoryStore, RecordingMediaDeck, RecordingSurface,
        RejectingMediaDeck, TargetlessSurface,
    };

    use crate::application::fixture::ALL_UNLOCKED;

    fn frag(n: u8) -> FragmentId {
        FragmentId::new(n).unwrap()
    }

    struct Doubles {
        store: MemoryStore,
        surface: RecordingSurface,
        media: RecordingMediaDeck,
        bookmark: MemoryBookmark,
    }

    fn archive_with(store: MemoryStore, bookmark: MemoryBookmark) -> (Archive, Doubles) {
        let doubles = Doubles {
            store,
            surface: RecordingSurface::new(),
            media: RecordingMediaDeck::new(),
            bookmark,
        };
        let ports = Ports {
            store: Box::new(doubles.store.clone()),
            surface: Box::new(doubles.surface.clone()),
            media: Box::new(doubles.media.clone()),
            bookmark: Box::new(doubles.bookmark.clone()),
            clock: Box::new(FixedClock::standard()),
        };
        let archive = Archive::new(&StoryConfig::builtin().unwrap(), ports).unwrap();
        (archive, doubles)
    }

    fn archive() -> (Archive, Doubles) {
        archive_with(MemoryStore::new(), MemoryBookmark::new())
    }

    fn send(archive: &mut Archive, control: Control) {
        archive.handle(&ControlCommand::new(control));
    }

    #[test]
    fn test_cold_start_without_bookmark_runs_intro() {
        let (mut archive, doubles) = archive();

        let scene = archive.start();

        assert_eq!(scene, SceneId::Intro);
        assert_eq!(doubles.bookmark.history(), vec![SceneId::Intro]);
        assert!(
            doubles
                .surface
                .effects()
                .iter()
                .any(|e| matches!(e, Effect::ProgressChanged(_)))
        );
    }

    #[test]
    fn test_cold_start_restores_bookmarked_scene() {
        let (mut archive, _doubles) = archive_with(MemoryStore::new(), MemoryBookmark::at("#fragment-2"));

        let scene = archive.start();

        assert_eq!(scene, SceneId::Fragment(frag(2)));
        assert!(archive.progress().badges[1].unlocked);
    }

    #[test]
    fn test_intro_boot_hub_flow_persists_boot_flag() {
        // Arrange
        let (mut archive, doubles) = archive();
        archive.start();

        // Act
        send(&mut archive, Control::FinishIntro);
        let home = archive.active_scene();
        send(&mut archive, Control::StartBoot);
        let boot = archive.active_scene();
        send(&mut archive, Control::FinishBoot);

        // Assert
        assert_eq!(home, SceneId::Home);
        assert_eq!(boot, SceneId::Boot);
        assert_eq!(archive.active_scene(), SceneId::Hub);
        assert_eq!(doubles.store.record("ma2089_booted").as_deref(), Some("1"));
    }

    #[test]
    fn test_start_boot_skips_terminal_once_booted() {
        let (mut archive, _doubles) = archive_with(
            MemoryStore::with_record("ma2089_booted", "1"),
            MemoryBookmark::new(),
        );
        archive.start();

        send(&mut archive, Control::StartBoot);

        assert_eq!(archive.active_scene(), SceneId::Hub);
    }

    #[test]
    fn test_cues_reach_media_deck_not_surface() {
        // Arrange
        let (mut archive, doubles) = archive();
        archive.start();

        // Act
        send(&mut archive, Control::OpenFragment(frag(2)));

        // Assert
        assert!(
            doubles
                .media
                .calls()
                .contains(&MediaCall::Play(CueId::new("m_frag2_dossier"), Playback::ONCE))
        );
        assert!(
            !doubles
                .surface
                .effects()
                .iter()
                .any(|e| matches!(e, Effect::PlayCue { .. } | Effect::BookmarkReplaced { .. }))
        );
    }

    #[test]
    fn test_full_escalation_through_archive() {
        // Arrange
        let (mut archive, doubles) = archive_with(
            MemoryStore::with_record("ma2089_seen", ALL_UNLOCKED),
            MemoryBookmark::new(),
        );
        archive.start();

        // Act
        send(&mut archive, Control::OpenFragment(frag(3)));
        archive.advance(Duration::from_millis(15_000));
        let warned = archive.escalation_state();
        archive.advance(Duration::from_millis(8_600));

        // Assert
        assert_eq!(warned, EscalationState::Warned);
        assert_eq!(archive.escalation_state(), EscalationState::Fired);
        let effects = doubles.surface.effects();
        assert!(effects.iter().any(|e| matches!(e, Effect::WarningShown(_))));
        assert!(effects.contains(&Effect::BlackoutShown));
        assert!(effects.contains(&Effect::RevealShown));
        assert!(doubles.media.playing().contains(&"trailer".to_owned()));
    }

    #[test]
    fn test_confirmed_reset_returns_to_hub_with_nothing_unlocked() {
        // Arrange
        let (mut archive, doubles) = archive_with(
            MemoryStore::with_record("ma2089_seen", ALL_UNLOCKED),
            MemoryBookmark::new(),
        );
        archive.start();
        send(&mut archive, Control::OpenFragment(frag(1)));
        send(&mut archive, Control::OpenFragment(frag(3)));
        archive.advance(Duration::from_millis(23_000));
        assert_eq!(archive.escalation_state(), EscalationState::Fired);

        // Act
        send(&mut archive, Control::ResetProgress(ResetConfirmation::Confirmed));

        // Assert
        assert!(!archive.is_complete());
        assert_eq!(archive.progress().unlocked, 0);
        assert_eq!(archive.escalation_state(), EscalationState::Idle);
        assert!(archive.dock().is_empty());
        assert_eq!(archive.active_scene(), SceneId::Hub);
        assert_eq!(archive.pending_tasks(), 1, "only the hub narration start is queued");
        assert_eq!(doubles.store.record("ma2089_seen"), None);
        assert!(doubles.media.playing().is_empty());
    }

    #[test]
    fn test_declined_reset_changes_nothing() {
        let (mut archive, _doubles) = archive_with(
            MemoryStore::with_record("ma2089_seen", ALL_UNLOCKED),
            MemoryBookmark::new(),
        );
        archive.start();

        send(&mut archive, Control::ResetProgress(ResetConfirmation::Declined));

        assert!(archive.is_complete());
        assert_eq!(archive.active_scene(), SceneId::Intro);
    }

    #[test]
    fn test_toggle_theme_persists_palette() {
        let (mut archive, doubles) = archive();
        archive.start();

        send(&mut archive, Control::ToggleTheme);

        assert_eq!(archive.theme(), Theme::Cp2077);
        assert_eq!(doubles.store.record("ma2089_theme").as_deref(), Some("cp"));
    }

    #[test]
    fn test_terminal_sound_switch_reaches_surface_and_leaves_media_alone() {
        // Arrange
        let (mut archive, doubles) = archive();
        archive.start();
        let media_before = doubles.media.calls().len();

        // Act
        send(&mut archive, Control::SetTerminalSound(false));

        // Assert
        assert!(!archive.terminal_sound());
        assert!(archive.narration_audio());
        assert!(
            doubles
                .surface
                .effects()
                .contains(&Effect::TerminalSoundSet { enabled: false })
        );
        assert_eq!(doubles.media.calls().len(), media_before);
        assert_eq!(doubles.store.record("ma2089_theme"), None);
    }

    #[test]
    fn test_muted_narration_plays_no_cue() {
        let (mut archive, doubles) = archive();
        archive.start();

        send(&mut archive, Control::SetNarrationAudio(false));
        send(&mut archive, Control::OpenFragment(frag(1)));
        archive.advance(Duration::from_secs(2));

        assert!(!archive.narration_audio());
        assert!(doubles.media.playing().is_empty());
        assert!(doubles.surface.narrator_text().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn test_collaborator_failures_are_swallowed() {
        // Arrange
        let ports = Ports {
            store: Box::new(MemoryStore::new()),
            surface: Box::new(TargetlessSurface),
            media: Box::new(RejectingMediaDeck),
            bookmark: Box::new(MemoryBookmark::new()),
            clock: Box::new(FixedClock::standard()),
        };
        let mut archive = Archive::new(&StoryConfig::builtin().unwrap(), ports).unwrap();

        // Act
        archive.start();
        send(&mut archive, Control::OpenFragment(frag(2)));
        archive.advance(Duration::from_secs(10));

        // Assert
        assert_eq!(archive.dock().focused(), Some(frag(2)));
        assert!(archive.narration().is_some());
    }

    #[derive(Clone, Default)]
    struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_delivered_effects_are_traced_with_their_payload() {
        // Arrange
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        let (mut archive, _doubles) = archive();

        // Act
        tracing::subscriber::with_default(subscriber, || {
            archive.start();
        });

        // Assert
        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let line = logs
            .lines()
            .find(|l| l.contains(r#""event_type":"navigator.scene_shown""#))
            .unwrap();
        assert!(line.contains("delivering effect"));
        assert!(line.contains(r#"\"effect\":\"scene_shown\""#));
    }
}
