//! Dock state: open fragment tabs in opening order, at most one focused.

use memarchive_core::ids::FragmentId;

/// One open fragment tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockEntry {
    pub fragment: FragmentId,
    pub focused: bool,
}

/// The tab container.
#[derive(Debug, Default)]
pub struct Dock {
    entries: Vec<DockEntry>,
    visible: bool,
}

impl Dock {
    /// Tabs in opening order.
    #[must_use]
    pub fn entries(&self) -> &[DockEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, fragment: FragmentId) -> bool {
        self.entries.iter().any(|e| e.fragment == fragment)
    }

    /// The focused tab, if any.
    #[must_use]
    pub fn focused(&self) -> Option<FragmentId> {
        self.entries.iter().find(|e| e.focused).map(|e| e.fragment)
    }

    /// The most recently opened tab.
    #[must_use]
    pub fn last(&self) -> Option<FragmentId> {
        self.entries.last().map(|e| e.fragment)
    }

    /// Shows the container. Returns `true` if it was hidden.
    pub fn show(&mut self) -> bool {
        !std::mem::replace(&mut self.visible, true)
    }

    /// Hides the container. Returns `true` if it was visible.
    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    /// Appends an unfocused tab. Returns `false` if it is already open.
    pub fn push(&mut self, fragment: FragmentId) -> bool {
        if self.contains(fragment) {
            return false;
        }
        self.entries.push(DockEntry {
            fragment,
            focused: false,
        });
        true
    }

    /// Focuses `fragment` and unfocuses every other tab. Returns `false` if
    /// the tab is not open.
    pub fn set_focus(&mut self, fragment: FragmentId) -> bool {
        if !self.contains(fragment) {
            return false;
        }
        for entry in &mut self.entries {
            entry.focused = entry.fragment == fragment;
        }
        true
    }

    /// Removes a tab, returning it.
    pub fn remove(&mut self, fragment: FragmentId) -> Option<DockEntry> {
        let index = self.entries.iter().position(|e| e.fragment == fragment)?;
        Some(self.entries.remove(index))
    }

    /// Removes every tab.
    pub fn clear(&mut self) -> Vec<DockEntry> {
        std::mem::take(&mut self.entries)
    }
}
