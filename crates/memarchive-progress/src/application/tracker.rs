//! The Progress Tracker: ledger ownership, persistence, and recompute.

use memarchive_core::event::{Effect, ProgressSnapshot};
use memarchive_core::ids::FragmentId;
use memarchive_core::schedule::Context;
use memarchive_core::store::KeyValueStore;
use tracing::{debug, info, warn};

use crate::domain::ledger::ProgressLedger;

/// Whether ledger changes still reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Reads and writes go to the store.
    Durable,
    /// The store failed; the ledger lives in memory only.
    Degraded,
}

/// Owns the unlock ledger for a fixed, ordered set of fragments.
#[derive(Debug)]
pub struct ProgressTracker {
    key: String,
    fragments: Vec<FragmentId>,
    ledger: ProgressLedger,
    persistence: Persistence,
}

impl ProgressTracker {
    /// Loads the ledger stored under `key`.
    ///
    /// A corrupt record starts an empty ledger that will overwrite it; an
    /// unreachable store starts an empty in-memory ledger.
    #[must_use]
    pub fn load(key: impl Into<String>, fragments: Vec<FragmentId>, store: &dyn KeyValueStore) -> Self {
        let key = key.into();
        let (ledger, persistence) = match store.get(&key) {
            Ok(None) => (ProgressLedger::default(), Persistence::Durable),
            Ok(Some(raw)) => match ProgressLedger::decode(&raw) {
                Ok(ledger) => (ledger, Persistence::Durable),
                Err(e) => {
                    warn!(key = %key, error = %e, "corrupt progress record; starting empty");
                    (ProgressLedger::default(), Persistence::Durable)
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "progress storage unavailable; continuing in memory");
                (ProgressLedger::default(), Persistence::Degraded)
            }
        };

        let tracker = Self {
            key,
            fragments,
            ledger,
            persistence,
        };
        debug!(
            unlocked = tracker.unlocked_count(),
            total = tracker.total(),
            "progress ledger loaded"
        );
        tracker
    }

    /// The configured fragments, in story order.
    #[must_use]
    pub fn fragments(&self) -> &[FragmentId] {
        &self.fragments
    }

    /// Whether `fragment` belongs to the story.
    #[must_use]
    pub fn knows(&self, fragment: FragmentId) -> bool {
        self.fragments.contains(&fragment)
    }

    /// Whether `fragment` has been unlocked.
    #[must_use]
    pub fn is_unlocked(&self, fragment: FragmentId) -> bool {
        self.ledger.is_unlocked(fragment)
    }

    /// Number of unlocked fragments.
    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.ledger.unlocked_count(&self.fragments)
    }

    /// Number of fragments in the story.
    #[must_use]
    pub fn total(&self) -> usize {
        self.fragments.len()
    }

    /// Whether every fragment is unlocked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unlocked_count() == self.total()
    }

    /// Current persistence mode.
    #[must_use]
    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    /// Progress widgets for the current ledger.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.ledger.snapshot(&self.fragments)
    }

    /// Unlocks `fragment` and persists the ledger. Always republishes the
    /// progress widgets. Returns `true` if the flag was newly set.
    pub fn mark_unlocked<T>(
        &mut self,
        fragment: FragmentId,
        store: &dyn KeyValueStore,
        cx: &mut Context<'_, T>,
    ) -> bool {
        let changed = if self.knows(fragment) {
            self.ledger.unlock(fragment)
        } else {
            debug!(%fragment, "ignoring unlock of fragment outside the story");
            false
        };

        if changed {
            info!(
                %fragment,
                unlocked = self.unlocked_count(),
                total = self.total(),
                "fragment unlocked"
            );
            self.persist(store);
        }
        self.publish(cx);
        changed
    }

    /// Clears every flag and deletes the stored record.
    pub fn reset_all<T>(&mut self, store: &dyn KeyValueStore, cx: &mut Context<'_, T>) {
        self.ledger = ProgressLedger::default();
        if self.persistence == Persistence::Durable {
            if let Err(e) = store.remove(&self.key) {
                warn!(key = %self.key, error = %e, "failed to clear progress record; continuing in memory");
                self.persistence = Persistence::Degraded;
            }
        }
        info!("progress ledger reset");
        self.publish(cx);
    }

    /// Emits the current progress widgets.
    pub fn publish<T>(&self, cx: &mut Context<'_, T>) {
        cx.emit(Effect::ProgressChanged(self.snapshot()));
    }

    fn persist(&mut self, store: &dyn KeyValueStore) {
        if self.persistence == Persistence::Degraded {
            return;
        }
        if let Err(e) = store.set(&self.key, &self.ledger.encode()) {
            warn!(key = %self.key, error = %e, "failed to persist progress; continuing in memory");
            self.persistence = Persistence::Degraded;
        }
    }
}
