//! Identifiers for fragments, scenes, narration contexts and media cues.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

const FRAGMENT_PREFIX: &str = "fragment-";

/// An unlockable narrative chapter, rendered as `fragment-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FragmentId(u8);

impl FragmentId {
    /// Creates a fragment identifier from its one-based ordinal.
    #[must_use]
    pub const fn new(ordinal: u8) -> Option<Self> {
        if ordinal == 0 {
            None
        } else {
            Some(Self(ordinal))
        }
    }

    /// Returns the one-based ordinal.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self.0
    }

    /// Short label used on dock tabs (`FRAG 2`).
    #[must_use]
    pub fn tab_label(self) -> String {
        format!("FRAG {}", self.0)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{FRAGMENT_PREFIX}{}", self.0)
    }
}

impl FromStr for FragmentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(FRAGMENT_PREFIX)
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Self::new)
            .ok_or_else(|| IdError::Fragment(s.to_owned()))
    }
}

impl TryFrom<String> for FragmentId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FragmentId> for String {
    fn from(id: FragmentId) -> Self {
        id.to_string()
    }
}

/// One exclusively-active top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SceneId {
    /// Cold-start story intro.
    Intro,
    /// Terminal boot sequence.
    Boot,
    /// Landing page.
    Home,
    /// Archive terminal listing the fragments.
    Hub,
    /// Full-page fragment view (superseded by the dock for normal play).
    Fragment(FragmentId),
    /// Final memory.
    Finale,
}

impl SceneId {
    /// Returns the fragment backing this scene, if any.
    #[must_use]
    pub const fn fragment(self) -> Option<FragmentId> {
        match self {
            Self::Fragment(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intro => f.write_str("intro"),
            Self::Boot => f.write_str("boot"),
            Self::Home => f.write_str("home"),
            Self::Hub => f.write_str("hub"),
            Self::Fragment(id) => id.fmt(f),
            Self::Finale => f.write_str("finale"),
        }
    }
}

impl FromStr for SceneId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intro" => Ok(Self::Intro),
            "boot" => Ok(Self::Boot),
            "home" => Ok(Self::Home),
            "hub" => Ok(Self::Hub),
            "finale" => Ok(Self::Finale),
            other => other
                .parse::<FragmentId>()
                .map(Self::Fragment)
                .map_err(|_| IdError::Scene(other.to_owned())),
        }
    }
}

impl TryFrom<String> for SceneId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SceneId> for String {
    fn from(id: SceneId) -> Self {
        id.to_string()
    }
}

/// Names a narration script (`hub_intro`, `frag3_open`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(String);

impl ContextKey {
    /// Wraps a context key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names an audio or video asset known to the media deck.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueId(String);

impl CueId {
    /// Wraps a cue identifier.
    #[must_use]
    pub fn new(cue: impl Into<String>) -> Self {
        Self(cue.into())
    }

    /// Returns the cue as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual rigs toggled on scene entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rig {
    /// Pointer/gyro driven depth layers.
    #[serde(rename = "parallax")]
    Parallax,
    /// Layered horizontal scrollytelling.
    #[serde(rename = "hscroll")]
    HorizontalScroll,
}

impl Rig {
    /// Every rig, in dispatch order.
    pub const ALL: [Rig; 2] = [Rig::Parallax, Rig::HorizontalScroll];
}

/// Persisted visual palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    /// Default palette.
    #[default]
    #[serde(rename = "br")]
    Br2049,
    /// Alternate palette.
    #[serde(rename = "cp")]
    Cp2077,
}

impl Theme {
    /// Stored record value.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Br2049 => "br",
            Self::Cp2077 => "cp",
        }
    }

    /// Parses a stored record value.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "br" => Some(Self::Br2049),
            "cp" => Some(Self::Cp2077),
            _ => None,
        }
    }

    /// The other palette.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Br2049 => Self::Cp2077,
            Self::Cp2077 => Self::Br2049,
        }
    }
}
