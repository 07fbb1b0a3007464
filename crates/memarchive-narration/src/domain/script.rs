//! Static narration content: scripts keyed by context, and timing knobs.

use std::collections::HashMap;
use std::time::Duration;

use memarchive_core::ids::{ContextKey, CueId};
use serde::Deserialize;

/// Per-dispatch reveal options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SequenceOptions {
    /// Milliseconds per revealed character.
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
    /// Milliseconds between two segments.
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,
}

fn default_speed_ms() -> u64 {
    22
}

fn default_gap_ms() -> u64 {
    900
}

impl SequenceOptions {
    /// Builds options from millisecond values.
    #[must_use]
    pub const fn new(speed_ms: u64, gap_ms: u64) -> Self {
        Self { speed_ms, gap_ms }
    }
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self::new(default_speed_ms(), default_gap_ms())
    }
}

/// How long a fully revealed segment stays before the gap.
///
/// `hold = max(min_hold_ms, chars × speed × hold_factor)`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NarrationTiming {
    /// Floor for the hold.
    pub min_hold_ms: u64,
    /// Multiplier applied to the segment's reveal time.
    pub hold_factor: f64,
}

impl Default for NarrationTiming {
    fn default() -> Self {
        Self {
            min_hold_ms: 1200,
            hold_factor: 0.9,
        }
    }
}

impl NarrationTiming {
    /// Hold for a segment of `chars` characters revealed at `speed_ms`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn hold(&self, chars: usize, speed_ms: u64) -> Duration {
        let proportional = (chars as f64 * speed_ms as f64 * self.hold_factor).max(0.0) as u64;
        Duration::from_millis(proportional.max(self.min_hold_ms))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentSpec {
    Plain(String),
    Detailed {
        text: String,
        #[serde(default)]
        speed_ms: Option<u64>,
        #[serde(default)]
        gap_ms: Option<u64>,
    },
}

/// One text block of a script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SegmentSpec")]
pub struct Segment {
    text: String,
    chars: usize,
    speed_ms: Option<u64>,
    gap_ms: Option<u64>,
}

impl From<SegmentSpec> for Segment {
    fn from(spec: SegmentSpec) -> Self {
        match spec {
            SegmentSpec::Plain(text) => Self::new(text),
            SegmentSpec::Detailed {
                text,
                speed_ms,
                gap_ms,
            } => Self {
                speed_ms,
                gap_ms,
                ..Self::new(text)
            },
        }
    }
}

impl Segment {
    /// A segment using the dispatch options.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().count();
        Self {
            text,
            chars,
            speed_ms: None,
            gap_ms: None,
        }
    }

    /// Full text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    #[must_use]
    pub fn chars(&self) -> usize {
        self.chars
    }

    /// The first `n` characters.
    #[must_use]
    pub fn prefix(&self, n: usize) -> &str {
        match self.text.char_indices().nth(n) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    /// Reveal speed for this segment.
    #[must_use]
    pub fn speed(&self, options: SequenceOptions) -> Duration {
        Duration::from_millis(self.speed_ms.unwrap_or(options.speed_ms))
    }

    /// Speed in milliseconds, as used by the hold formula.
    #[must_use]
    pub fn speed_ms(&self, options: SequenceOptions) -> u64 {
        self.speed_ms.unwrap_or(options.speed_ms)
    }

    /// Gap after this segment.
    #[must_use]
    pub fn gap(&self, options: SequenceOptions) -> Duration {
        Duration::from_millis(self.gap_ms.unwrap_or(options.gap_ms))
    }
}

/// Ordered segments bound to one context, with an optional voice cue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NarrationScript {
    /// Audio played alongside the script.
    #[serde(default)]
    pub cue: Option<CueId>,
    /// Segments in play order.
    pub segments: Vec<Segment>,
}

/// Every script, keyed by context.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct NarrationTable {
    scripts: HashMap<ContextKey, NarrationScript>,
}

impl NarrationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a script.
    #[must_use]
    pub fn with_script(mut self, key: impl Into<String>, script: NarrationScript) -> Self {
        self.scripts.insert(ContextKey::new(key), script);
        self
    }

    /// Looks up a script.
    #[must_use]
    pub fn get(&self, key: &ContextKey) -> Option<&NarrationScript> {
        self.scripts.get(key)
    }

    /// Whether a script is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: &ContextKey) -> bool {
        self.scripts.contains_key(key)
    }

    /// Number of scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_counts_characters_not_bytes() {
        let segment = Segment::new("Déjà vu");

        assert_eq!(segment.chars(), 7);
        assert_eq!(segment.prefix(2), "Dé");
        assert_eq!(segment.prefix(4), "Déjà");
        assert_eq!(segment.prefix(99), "Déjà vu");
        assert_eq!(segment.prefix(0), "");
    }

    #[test]
    fn test_hold_has_floor_and_scales_with_length() {
        let timing = NarrationTiming::default();

        assert_eq!(timing.hold(10, 38), Duration::from_millis(1200));
        assert_eq!(timing.hold(100, 40), Duration::from_millis(3600));
    }

    #[test]
    fn test_table_deserializes_plain_and_detailed_segments() {
        // Arrange
        let yaml = r"
hub_intro:
  cue: m_hub_intro
  segments:
    - The system answered.
    - text: (silence)
      speed_ms: 80
      gap_ms: 2000
";

        // Act
        let table: NarrationTable = serde_yaml::from_str(yaml).unwrap();

        // Assert
        let script = table.get(&ContextKey::new("hub_intro")).unwrap();
        assert_eq!(script.cue, Some(CueId::new("m_hub_intro")));
        assert_eq!(script.segments.len(), 2);
        let options = SequenceOptions::new(38, 1200);
        assert_eq!(script.segments[0].speed(options), Duration::from_millis(38));
        assert_eq!(script.segments[1].speed(options), Duration::from_millis(80));
        assert_eq!(script.segments[1].gap(options), Duration::from_millis(2000));
        assert_eq!(script.segments[1].chars(), 9);
    }
}
