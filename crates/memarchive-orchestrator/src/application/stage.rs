//! Components shared by the Scene Navigator and the Dock Multiplexer, and
//! the per-turn view over them.

use memarchive_core::event::Outbox;
use memarchive_core::ids::SceneId;
use memarchive_core::schedule::{Context, Scheduler};
use memarchive_core::store::KeyValueStore;
use memarchive_escalation::application::timer::EscalationTimer;
use memarchive_narration::application::sequencer::Narrator;
use memarchive_progress::application::preferences::Preferences;
use memarchive_progress::application::tracker::ProgressTracker;
use tracing::debug;
use uuid::Uuid;

use crate::config::{ConfigError, StoryConfig};
use crate::domain::scene_table::SceneTable;
use crate::domain::task::Task;

/// The leaf components, owned once for the archive's lifetime.
#[derive(Debug)]
pub struct Components {
    /// Resolved per-scene dispatch.
    pub table: SceneTable,
    /// Unlocked fragments.
    pub tracker: ProgressTracker,
    /// Palette and boot flag.
    pub preferences: Preferences,
    /// Typewriter sequencer.
    pub narrator: Narrator,
    /// Staged warning, blackout and reveal.
    pub escalation: EscalationTimer,
}

impl Components {
    /// Resolves the scene table and loads every component's persisted
    /// state from `store`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the story does not resolve.
    pub fn load(story: &StoryConfig, store: &dyn KeyValueStore) -> Result<Self, ConfigError> {
        let table = SceneTable::resolve(story)?;
        let tracker = ProgressTracker::load(
            story.storage.progress.clone(),
            table.fragments().to_vec(),
            store,
        );
        Ok(Self {
            tracker,
            preferences: Preferences::load(&story.storage, store),
            narrator: Narrator::new(story.scripts.clone(), story.narration_timing),
            escalation: EscalationTimer::new(story.escalation.timer.clone()),
            table,
        })
    }

    /// Borrows every component for one turn of the loop.
    pub fn stage<'a>(
        &'a mut self,
        scheduler: &'a mut Scheduler<Task>,
        outbox: &'a mut Outbox,
        store: &'a dyn KeyValueStore,
        correlation_id: Uuid,
    ) -> Stage<'a> {
        Stage {
            table: &self.table,
            tracker: &mut self.tracker,
            preferences: &mut self.preferences,
            narrator: &mut self.narrator,
            escalation: &mut self.escalation,
            store,
            cx: Context::new(scheduler, outbox, correlation_id),
        }
    }
}

/// Mutable access to every component during one turn.
pub struct Stage<'a> {
    /// Resolved per-scene dispatch.
    pub table: &'a SceneTable,
    /// Unlocked fragments.
    pub tracker: &'a mut ProgressTracker,
    /// Palette and boot flag.
    pub preferences: &'a mut Preferences,
    /// Typewriter sequencer.
    pub narrator: &'a mut Narrator,
    /// Staged warning, blackout and reveal.
    pub escalation: &'a mut EscalationTimer,
    /// Persistent records written during the turn.
    pub store: &'a dyn KeyValueStore,
    /// Scheduler and outbox, tagged with the turn's correlation id.
    pub cx: Context<'a, Task>,
}

impl Stage<'_> {
    /// Stops narration and cancels a not-yet-visible escalation.
    pub fn tear_down(&mut self) {
        self.narrator.stop(&mut self.cx);
        self.escalation.disarm(&mut self.cx);
    }

    /// Starts the narration bound to `scene`, after its settle delay.
    pub fn dispatch_narration(&mut self, scene: SceneId) {
        match self.table.narration(scene) {
            Some(dispatch) => {
                self.narrator
                    .enqueue(&dispatch.key, dispatch.options, dispatch.settle, &mut self.cx);
            }
            None => debug!(%scene, "no narration bound to scene"),
        }
    }

    /// Arms the escalation for the eligible scene once every fragment is
    /// unlocked; disarms it everywhere else. An already armed timer is
    /// restarted.
    pub fn gate_escalation(&mut self, scene: SceneId) {
        self.escalation.disarm(&mut self.cx);
        if !self.table.is_escalation_scene(scene) {
            return;
        }
        if self.tracker.is_complete() {
            self.escalation.arm(&mut self.cx);
        } else {
            debug!(%scene, "escalation scene entered before completion");
        }
    }

    /// Runs one due task.
    pub fn run(&mut self, task: Task) {
        match task {
            Task::Narration(task) => self.narrator.handle(task, &mut self.cx),
            Task::Escalation(task) => self.escalation.handle(task, &mut self.cx),
        }
    }
}
