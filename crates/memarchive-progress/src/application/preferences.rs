//! Preferences: the persisted palette and boot-completed flag, and the
//! session-only terminal sound switch.

use memarchive_core::event::Effect;
use memarchive_core::ids::Theme;
use memarchive_core::schedule::Context;
use memarchive_core::store::KeyValueStore;
use tracing::{debug, warn};

use crate::domain::keys::StorageKeys;

const BOOTED: &str = "1";

/// Palette and boot flag, read once at startup.
#[derive(Debug)]
pub struct Preferences {
    theme_key: String,
    boot_key: String,
    theme: Theme,
    booted: bool,
    terminal_sound: bool,
}

impl Preferences {
    /// Reads both records. Missing, unknown or unreadable values fall back to
    /// the defaults.
    #[must_use]
    pub fn load(keys: &StorageKeys, store: &dyn KeyValueStore) -> Self {
        let theme = match store.get(&keys.theme) {
            Ok(Some(code)) => Theme::from_code(&code).unwrap_or_else(|| {
                debug!(code = %code, "unknown theme record; using default");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "theme record unreadable; using default");
                Theme::default()
            }
        };
        let booted = match store.get(&keys.boot) {
            Ok(value) => value.as_deref() == Some(BOOTED),
            Err(e) => {
                warn!(error = %e, "boot record unreadable; assuming first run");
                false
            }
        };

        Self {
            theme_key: keys.theme.clone(),
            boot_key: keys.boot.clone(),
            theme,
            booted,
            terminal_sound: true,
        }
    }

    /// Current palette.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the boot sequence has completed on this device.
    #[must_use]
    pub fn booted(&self) -> bool {
        self.booted
    }

    /// Applies and persists a palette.
    pub fn apply_theme<T>(&mut self, theme: Theme, store: &dyn KeyValueStore, cx: &mut Context<'_, T>) {
        self.theme = theme;
        if let Err(e) = store.set(&self.theme_key, theme.code()) {
            warn!(error = %e, "failed to persist theme");
        }
        self.publish_theme(cx);
    }

    /// Switches to the other palette.
    pub fn toggle_theme<T>(&mut self, store: &dyn KeyValueStore, cx: &mut Context<'_, T>) {
        self.apply_theme(self.theme.toggled(), store, cx);
    }

    /// Emits the current palette.
    pub fn publish_theme<T>(&self, cx: &mut Context<'_, T>) {
        cx.emit(Effect::ThemeApplied { theme: self.theme });
    }

    /// Whether terminal blips are on. Starts on for every session.
    #[must_use]
    pub fn terminal_sound(&self) -> bool {
        self.terminal_sound
    }

    /// Turns terminal blips on or off. Not persisted.
    pub fn set_terminal_sound<T>(&mut self, enabled: bool, cx: &mut Context<'_, T>) {
        self.terminal_sound = enabled;
        cx.emit(Effect::TerminalSoundSet { enabled });
        debug!(enabled, "terminal sound set");
    }

    /// Records that the boot sequence completed.
    pub fn mark_booted(&mut self, store: &dyn KeyValueStore) {
        self.booted = true;
        if let Err(e) = store.set(&self.boot_key, BOOTED) {
            warn!(error = %e, "failed to persist boot flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memarchive_core::event::Outbox;
    use memarchive_core::schedule::Scheduler;
    use memarchive_test_support::{CorruptStore, FailingStore, FixedClock, MemoryStore};
    use uuid::Uuid;

    #[test]
    fn test_load_defaults_when_records_absent() {
        let prefs = Preferences::load(&StorageKeys::default(), &MemoryStore::new());

        assert_eq!(prefs.theme(), Theme::Br2049);
        assert!(!prefs.booted());
    }

    #[test]
    fn test_load_reads_stored_records() {
        let store = MemoryStore::with_record("ma2089_theme", "cp");
        store.set("ma2089_booted", "1").unwrap();

        let prefs = Preferences::load(&StorageKeys::default(), &store);

        assert_eq!(prefs.theme(), Theme::Cp2077);
        assert!(prefs.booted());
    }

    #[test]
    fn test_load_survives_broken_storage() {
        let failing = Preferences::load(&StorageKeys::default(), &FailingStore);
        let corrupt = Preferences::load(&StorageKeys::default(), &CorruptStore::new());

        assert_eq!(failing.theme(), Theme::default());
        assert!(!failing.booted());
        assert_eq!(corrupt.theme(), Theme::default());
        assert!(!corrupt.booted());
    }

    #[test]
    fn test_toggle_theme_persists_and_emits() {
        // Arrange
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(&StorageKeys::default(), &store);
        let mut scheduler: Scheduler<()> = Scheduler::new();
        let mut outbox = Outbox::new(Box::new(FixedClock::standard()));

        // Act
        {
            let mut cx = Context::new(&mut scheduler, &mut outbox, Uuid::new_v4());
            prefs.toggle_theme(&store, &mut cx);
        }

        // Assert
        assert_eq!(prefs.theme(), Theme::Cp2077);
        assert_eq!(store.record("ma2089_theme").as_deref(), Some("cp"));
        assert_eq!(
            outbox.drain()[0].effect,
            Effect::ThemeApplied {
                theme: Theme::Cp2077
            }
        );
    }

    #[test]
    fn test_terminal_sound_is_session_only() {
        // Arrange
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(&StorageKeys::default(), &store);
        let mut scheduler: Scheduler<()> = Scheduler::new();
        let mut outbox = Outbox::new(Box::new(FixedClock::standard()));
        let initially = prefs.terminal_sound();

        // Act
        {
            let mut cx = Context::new(&mut scheduler, &mut outbox, Uuid::new_v4());
            prefs.set_terminal_sound(false, &mut cx);
        }
        let reloaded = Preferences::load(&StorageKeys::default(), &store);

        // Assert
        assert!(initially);
        assert!(!prefs.terminal_sound());
        assert_eq!(
            outbox.drain()[0].effect,
            Effect::TerminalSoundSet { enabled: false }
        );
        assert!(reloaded.terminal_sound());
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_mark_booted_persists_flag() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::load(&StorageKeys::default(), &store);

        prefs.mark_booted(&store);

        assert!(prefs.booted());
        assert_eq!(store.record("ma2089_booted").as_deref(), Some("1"));
    }
}
