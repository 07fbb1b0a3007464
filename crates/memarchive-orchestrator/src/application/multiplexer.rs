//! The Dock Multiplexer.
//!
//! Several fragments can be open as tabs, but only the focused one is shown
//! and only the focused one narrates. Focus changes re-derive narration and
//! escalation exactly as a scene change would.

use memarchive_core::event::Effect;
use memarchive_core::ids::{FragmentId, SceneId};
use tracing::{debug, info};

use crate::application::stage::Stage;
use crate::domain::dock::Dock;

/// Owns the dock and routes tab operations through the shared components.
#[derive(Debug, Default)]
pub struct DockMultiplexer {
    dock: Dock,
}

impl DockMultiplexer {
    /// An empty, hidden dock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tabs, focus and visibility.
    #[must_use]
    pub fn dock(&self) -> &Dock {
        &self.dock
    }

    /// Opens `fragment` as a tab and focuses it. An already open tab is only
    /// focused. Returns `false` for fragments outside the story.
    pub fn open(&mut self, fragment: FragmentId, stage: &mut Stage<'_>) -> bool {
        if !stage.table.fragments().contains(&fragment) {
            debug!(%fragment, "ignoring open of fragment outside the story");
            return false;
        }
        if self.dock.show() {
            stage.cx.emit(Effect::DockShown);
        }

        if self.dock.push(fragment) {
            stage.cx.emit(Effect::DockTabAdded { fragment });
            stage
                .tracker
                .mark_unlocked(fragment, stage.store, &mut stage.cx);
            info!(%fragment, tabs = self.dock.entries().len(), "dock tab opened");
        }
        self.focus(fragment, stage)
    }

    /// Focuses an open tab, then dispatches its narration and escalation
    /// gating. Moving focus away from another tab stops that tab's narration
    /// first, even when the new tab narrates late or not at all. Returns
    /// `false` if the tab is not open.
    pub fn focus(&mut self, fragment: FragmentId, stage: &mut Stage<'_>) -> bool {
        let previous = self.dock.focused();
        if !self.dock.set_focus(fragment) {
            debug!(%fragment, "ignoring focus of closed tab");
            return false;
        }
        stage.cx.emit(Effect::DockFocused { fragment });
        if previous.is_some_and(|p| p != fragment) {
            stage.narrator.stop(&mut stage.cx);
        }

        let scene = SceneId::Fragment(fragment);
        stage.dispatch_narration(scene);
        stage.gate_escalation(scene);
        debug!(%fragment, "dock tab focused");
        true
    }

    /// Closes a tab. Closing the focused tab focuses the most recently opened
    /// remaining one; closing the last tab hides the dock, stops narration
    /// and disarms the escalation.
    pub fn close(&mut self, fragment: FragmentId, stage: &mut Stage<'_>) -> bool {
        let Some(removed) = self.dock.remove(fragment) else {
            debug!(%fragment, "ignoring close of tab that is not open");
            return false;
        };
        stage.cx.emit(Effect::DockTabRemoved { fragment });
        info!(%fragment, tabs = self.dock.entries().len(), "dock tab closed");

        if self.dock.is_empty() {
            if self.dock.hide() {
                stage.cx.emit(Effect::DockHidden);
            }
            stage.tear_down();
        } else if removed.focused {
            if let Some(next) = self.dock.last() {
                self.focus(next, stage);
            }
        }
        true
    }

    /// Removes every tab and hides the dock without touching narration or
    /// escalation.
    pub fn close_all(&mut self, stage: &mut Stage<'_>) {
        for entry in self.dock.clear() {
            stage.cx.emit(Effect::DockTabRemoved {
                fragment: entry.fragment,
            });
        }
        if self.dock.hide() {
            stage.cx.emit(Effect::DockHidden);
        }
    }
}
