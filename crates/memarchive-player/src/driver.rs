//! The player loop.
//!
//! The archive runs on virtual time measured from the moment the player was
//! created. The loop waits for either the next input line or the archive's
//! next deadline, whichever comes first, and catches the archive up to the
//! wall clock before every control.

use std::io::Write;
use std::time::Duration;

use memarchive_core::ids::SceneId;
use memarchive_orchestrator::application::archive::Archive;
use memarchive_orchestrator::domain::commands::ControlCommand;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::error::AppError;
use crate::input::{HELP, Input};

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Couples an archive to an input stream and a console for replies.
pub struct Player<W> {
    archive: Archive,
    origin: Instant,
    console: W,
}

impl<W: Write> Player<W> {
    /// Starts the virtual clock now.
    pub fn new(archive: Archive, console: W) -> Self {
        Self {
            archive,
            origin: Instant::now(),
            console,
        }
    }

    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Enters the bookmarked scene.
    pub fn start(&mut self) -> SceneId {
        self.archive.start()
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn catch_up(&mut self) {
        let now = self.elapsed();
        self.archive.advance_to(now);
    }

    /// Applies one input line.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the console cannot be written.
    pub fn submit(&mut self, line: &str) -> std::io::Result<Flow> {
        self.catch_up();
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match line.parse::<Input>() {
            Ok(Input::Control(control)) => {
                self.archive.handle(&ControlCommand::new(control));
            }
            Ok(Input::Status) => {
                let status = self.status();
                writeln!(self.console, "{status}")?;
            }
            Ok(Input::Help) => writeln!(self.console, "{HELP}")?,
            Ok(Input::Quit) => return Ok(Flow::Quit),
            Err(e) => {
                debug!(%line, error = %e, "rejected input");
                writeln!(self.console, "? {e}")?;
            }
        }
        Ok(Flow::Continue)
    }

    /// One-line summary of the archive.
    #[must_use]
    pub fn status(&self) -> String {
        let archive = &self.archive;
        let progress = archive.progress();
        let tabs: Vec<String> = archive
            .dock()
            .entries()
            .iter()
            .map(|entry| {
                let marker = if entry.focused { "*" } else { "" };
                format!("{marker}{}", entry.fragment)
            })
            .collect();
        format!(
            "scene={} progress={}/{} escalation={} dock=[{}] theme={} audio={} sound={} persistence={:?}",
            archive.active_scene(),
            progress.unlocked,
            progress.total,
            archive.escalation_state(),
            tabs.join(","),
            archive.theme().code(),
            if archive.narration_audio() { "on" } else { "off" },
            if archive.terminal_sound() { "on" } else { "off" },
            archive.persistence(),
        )
    }

    /// Reads lines until `quit` or end of input, running scheduled steps as
    /// their deadlines pass.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the input or the console fails.
    pub async fn run<R>(&mut self, input: R) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let deadline = self.archive.next_deadline().map(|due| self.origin + due);
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("input closed");
                        break;
                    };
                    if self.submit(&line)? == Flow::Quit {
                        info!("player quit");
                        break;
                    }
                }
                () = wait_for(deadline) => self.catch_up(),
            }
        }
        Ok(())
    }
}

impl<W> std::fmt::Debug for Player<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("archive", &self.archive)
            .finish_non_exhaustive()
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
