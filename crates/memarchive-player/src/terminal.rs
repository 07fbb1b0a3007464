//! Text rendering of stage events, and a media deck that only logs.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use memarchive_core::error::{MediaError, SurfaceError};
use memarchive_core::event::{Effect, ProgressSnapshot, StageEvent};
use memarchive_core::ids::{CueId, Rig};
use memarchive_core::media::{MediaDeck, Playback};
use memarchive_core::surface::Surface;
use tracing::{debug, info, warn};

const BELL: char = '\u{7}';

struct Screen<W> {
    out: W,
    narration: String,
    sound: bool,
}

/// Writes one line per visible change.
///
/// Narration is printed once per segment, when it is fully revealed, rather
/// than once per typed character. While terminal sound is on, the reveal
/// line rings the bell.
pub struct TerminalSurface<W> {
    screen: Mutex<Screen<W>>,
}

impl<W: Write + Send> TerminalSurface<W> {
    /// Renders into `out`, with terminal sound on.
    pub fn new(out: W) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                narration: String::new(),
                sound: true,
            }),
        }
    }
}

impl<W> std::fmt::Debug for TerminalSurface<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface").finish_non_exhaustive()
    }
}

impl<W: Write + Send> Surface for TerminalSurface<W> {
    fn apply(&self, event: &StageEvent) -> Result<(), SurfaceError> {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let line = match &event.effect {
            Effect::NarratorText { text } => {
                screen.narration.clone_from(text);
                None
            }
            Effect::NarratorIdle => Some(narration_line(&screen.narration)),
            Effect::NarratorHidden => {
                screen.narration.clear();
                None
            }
            Effect::TerminalSoundSet { enabled } => {
                screen.sound = *enabled;
                Some(format!("sound {}", if *enabled { "on" } else { "off" }))
            }
            Effect::RevealShown if screen.sound => Some(format!(">> terminal reveal{BELL}")),
            effect => render(effect),
        };
        let Some(line) = line else {
            return Ok(());
        };
        writeln!(screen.out, "{line}")
            .and_then(|()| screen.out.flush())
            .map_err(|e| {
                warn!(error = %e, "terminal write failed");
                SurfaceError::MissingTarget("terminal")
            })
    }
}

fn narration_line(text: &str) -> String {
    let mut line = String::new();
    for (i, row) in text.lines().enumerate() {
        if i > 0 {
            line.push('\n');
        }
        let _ = write!(line, "  > {row}");
    }
    line
}

fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let badges: String = snapshot
        .badges
        .iter()
        .map(|b| if b.unlocked { "[x]" } else { "[ ]" })
        .collect();
    let finale = if snapshot.finale_ready { " finale ready" } else { "" };
    format!("progress {}/{} {badges}{finale}", snapshot.unlocked, snapshot.total)
}

fn rig_name(rig: Rig) -> &'static str {
    match rig {
        Rig::Parallax => "parallax",
        Rig::HorizontalScroll => "hscroll",
    }
}

fn render(effect: &Effect) -> Option<String> {
    let line = match effect {
        Effect::SceneShown { scene } => format!("== {scene} =="),
        Effect::RigToggled { rig, enabled: true } => format!("   ({} rig)", rig_name(*rig)),
        Effect::ProgressChanged(snapshot) => progress_line(snapshot),
        Effect::ThemeApplied { theme } => format!("theme {}", theme.code()),
        Effect::WarningShown(copy) => format!("!! {} | {} | {}", copy.title, copy.main, copy.sub),
        Effect::WarningHidden => "!! warning cleared".to_owned(),
        Effect::BlackoutShown => "## blackout ##".to_owned(),
        Effect::BlackoutHidden => "## blackout lifted".to_owned(),
        Effect::RevealShown => ">> terminal reveal".to_owned(),
        Effect::DockShown => "[dock open]".to_owned(),
        Effect::DockHidden => "[dock closed]".to_owned(),
        Effect::DockTabAdded { fragment } => format!("[+ {}]", fragment.tab_label()),
        Effect::DockTabRemoved { fragment } => format!("[- {}]", fragment.tab_label()),
        Effect::DockFocused { fragment } => format!("[* {}]", fragment.tab_label()),
        _ => return None,
    };
    Some(line)
}

/// A deck with no audio output: every cue is accepted and logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMediaDeck;

impl MediaDeck for LoggingMediaDeck {
    fn play(&self, cue: &CueId, playback: Playback) -> Result<(), MediaError> {
        info!(%cue, looped = playback.looped, volume = playback.volume, "cue playing");
        Ok(())
    }

    fn stop(&self, cue: &CueId) -> Result<(), MediaError> {
        debug!(%cue, "cue stopped");
        Ok(())
    }
}
