//! Components wired to in-memory doubles for unit tests.

use std::time::Duration;

use memarchive_core::event::{Effect, Outbox};
use memarchive_core::schedule::Scheduler;
use memarchive_test_support::{FixedClock, MemoryStore};
use uuid::Uuid;

use crate::application::stage::{Components, Stage};
use crate::config::StoryConfig;
use crate::domain::task::Task;

pub(crate) const ALL_UNLOCKED: &str = r#"{"fragment-1":true,"fragment-2":true,"fragment-3":true}"#;

pub(crate) struct Fixture {
    pub components: Components,
    pub scheduler: Scheduler<Task>,
    pub outbox: Outbox,
    pub store: MemoryStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn completed() -> Self {
        Self::with_store(MemoryStore::with_record("ma2089_seen", ALL_UNLOCKED))
    }

    /// Fresh state over a customised story.
    pub fn from_story(story: StoryConfig) -> Self {
        Self::build(&story, MemoryStore::new())
    }

    fn with_store(store: MemoryStore) -> Self {
        Self::build(&StoryConfig::builtin().unwrap(), store)
    }

    fn build(story: &StoryConfig, store: MemoryStore) -> Self {
        Self {
            components: Components::load(story, &store).unwrap(),
            scheduler: Scheduler::new(),
            outbox: Outbox::new(Box::new(FixedClock::standard())),
            store,
        }
    }

    pub fn with_stage<R>(&mut self, f: impl FnOnce(&mut Stage<'_>) -> R) -> R {
        let mut stage = self.components.stage(
            &mut self.scheduler,
            &mut self.outbox,
            &self.store,
            Uuid::new_v4(),
        );
        f(&mut stage)
    }

    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + Duration::from_millis(ms);
        while let Some(due) = self.scheduler.pop_due(until) {
            let mut stage = self.components.stage(
                &mut self.scheduler,
                &mut self.outbox,
                &self.store,
                due.correlation_id,
            );
            stage.run(due.task);
        }
        self.scheduler.advance_to(until);
    }

    pub fn effects(&mut self) -> Vec<Effect> {
        self.outbox.drain().into_iter().map(|e| e.effect).collect()
    }
}
