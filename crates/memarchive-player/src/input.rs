//! Line-based player commands.

use std::str::FromStr;

use memarchive_core::ids::{FragmentId, SceneId};
use memarchive_orchestrator::domain::commands::{Control, ResetConfirmation};
use thiserror::Error;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forward a control to the archive.
    Control(Control),
    /// Print a one-line summary of the archive.
    Status,
    /// Print the command list.
    Help,
    /// Stop the player.
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("empty input")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid argument {0:?}")]
    Invalid(String),
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  go <scene>           activate intro, home, boot, hub, finale or fragment-<n>
  open|focus|close <n> manage fragment tabs in the dock
  reset yes            forget every unlocked fragment
  audio on|off         narration voice cues
  sound on|off         terminal bell on the reveal
  theme                switch palette
  skip-intro           leave the intro
  boot                 start the boot sequence
  finish-boot          finish the boot sequence
  status | help | quit";

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(InputError::Empty)?;
        let argument = words.next();

        let control = match command {
            "quit" | "exit" => return Ok(Self::Quit),
            "status" => return Ok(Self::Status),
            "help" | "?" => return Ok(Self::Help),
            "go" => Control::Navigate(scene(required("go", argument)?)?),
            "open" => Control::OpenFragment(fragment(required("open", argument)?)?),
            "focus" => Control::FocusFragment(fragment(required("focus", argument)?)?),
            "close" => Control::CloseFragment(fragment(required("close", argument)?)?),
            "reset" => Control::ResetProgress(match argument {
                Some("yes" | "y") => ResetConfirmation::Confirmed,
                _ => ResetConfirmation::Declined,
            }),
            "audio" => Control::SetNarrationAudio(switch(required("audio", argument)?)?),
            "sound" => Control::SetTerminalSound(switch(required("sound", argument)?)?),
            "theme" => Control::ToggleTheme,
            "skip-intro" => Control::FinishIntro,
            "boot" => Control::StartBoot,
            "finish-boot" => Control::FinishBoot,
            other => return Err(InputError::Unknown(other.to_owned())),
        };
        Ok(Self::Control(control))
    }
}

fn required<'a>(command: &'static str, argument: Option<&'a str>) -> Result<&'a str, InputError> {
    argument.ok_or(InputError::MissingArgument(command))
}

fn switch(raw: &str) -> Result<bool, InputError> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(InputError::Invalid(other.to_owned())),
    }
}

fn scene(raw: &str) -> Result<SceneId, InputError> {
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| InputError::Invalid(raw.to_owned()))
}

/// Accepts `2` as well as `fragment-2`.
fn fragment(raw: &str) -> Result<FragmentId, InputError> {
    raw.parse::<u8>()
        .ok()
        .and_then(FragmentId::new)
        .map_or_else(|| raw.parse::<FragmentId>(), Ok)
        .map_err(|_| InputError::Invalid(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(n: u8) -> FragmentId {
        FragmentId::new(n).unwrap()
    }

    #[test]
    fn test_parses_controls() {
        let cases = [
            ("go hub", Control::Navigate(SceneId::Hub)),
            ("go #fragment-3", Control::Navigate(SceneId::Fragment(frag(3)))),
            ("open 2", Control::OpenFragment(frag(2))),
            ("focus fragment-1", Control::FocusFragment(frag(1))),
            ("close 3", Control::CloseFragment(frag(3))),
            ("reset yes", Control::ResetProgress(ResetConfirmation::Confirmed)),
            ("reset", Control::ResetProgress(ResetConfirmation::Declined)),
            ("audio off", Control::SetNarrationAudio(false)),
            ("sound on", Control::SetTerminalSound(true)),
            ("theme", Control::ToggleTheme),
            ("skip-intro", Control::FinishIntro),
            ("boot", Control::StartBoot),
            ("finish-boot", Control::FinishBoot),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Input>(), Ok(Input::Control(expected)), "{line}");
        }
    }

    #[test]
    fn test_player_commands() {
        assert_eq!("  quit ".parse::<Input>(), Ok(Input::Quit));
        assert_eq!("status".parse::<Input>(), Ok(Input::Status));
        assert_eq!("help".parse::<Input>(), Ok(Input::Help));
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert_eq!("".parse::<Input>(), Err(InputError::Empty));
        assert_eq!("dance".parse::<Input>(), Err(InputError::Unknown("dance".to_owned())));
        assert_eq!("open".parse::<Input>(), Err(InputError::MissingArgument("open")));
        assert_eq!("open 0".parse::<Input>(), Err(InputError::Invalid("0".to_owned())));
        assert_eq!("go attic".parse::<Input>(), Err(InputError::Invalid("attic".to_owned())));
        assert_eq!("audio loud".parse::<Input>(), Err(InputError::Invalid("loud".to_owned())));
        assert_eq!("sound".parse::<Input>(), Err(InputError::MissingArgument("sound")));
    }
}
