//! Shared test helpers for player integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use memarchive_orchestrator::application::archive::{Archive, Ports};
use memarchive_orchestrator::config::StoryConfig;
use memarchive_player::bookmark::FileBookmark;
use memarchive_player::driver::Player;
use memarchive_player::store::JsonFileStore;
use memarchive_player::terminal::TerminalSurface;
use memarchive_test_support::{FixedClock, RecordingMediaDeck};
use tempfile::TempDir;

/// In-memory stand-in for stdout. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A fresh state directory, removed when the guard drops.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// A player wired to file-backed state in `dir` and captured output.
pub struct TestPlayer {
    pub player: Player<Capture>,
    pub screen: Capture,
    pub console: Capture,
    pub media: RecordingMediaDeck,
}

/// Builds a started player over the built-in story, the same way `main.rs`
/// wires it, with a fixed event clock and a recording media deck.
pub fn start_player(dir: &Path) -> TestPlayer {
    let screen = Capture::default();
    let console = Capture::default();
    let media = RecordingMediaDeck::new();
    let ports = Ports {
        store: Box::new(JsonFileStore::open(dir).unwrap()),
        surface: Box::new(TerminalSurface::new(screen.clone())),
        media: Box::new(media.clone()),
        bookmark: Box::new(FileBookmark::new(dir.join("location"))),
        clock: Box::new(FixedClock::standard()),
    };
    let archive = Archive::new(&StoryConfig::builtin().unwrap(), ports).unwrap();
    let mut player = Player::new(archive, console.clone());
    player.start();
    TestPlayer {
        player,
        screen,
        console,
        media,
    }
}
