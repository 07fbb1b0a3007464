//! Delays, cues and overlay copy of the escalation chain.

use std::time::Duration;

use memarchive_core::event::WarningCopy;
use memarchive_core::ids::CueId;
use memarchive_core::media::Playback;
use serde::Deserialize;

/// Media assets used by the chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EscalationCues {
    pub alert: CueId,
    pub alert_volume: f32,
    pub voice: CueId,
    pub siren: CueId,
    pub siren_volume: f32,
    pub reveal: CueId,
}

impl Default for EscalationCues {
    fn default() -> Self {
        Self {
            alert: CueId::new("alert_sfx"),
            alert_volume: 0.65,
            voice: CueId::new("warning_voice"),
            siren: CueId::new("warning_siren"),
            siren_volume: 0.2,
            reveal: CueId::new("trailer"),
        }
    }
}

impl EscalationCues {
    /// Cues started by the warning stage, with their playback.
    #[must_use]
    pub fn warning(&self) -> [(CueId, Playback); 3] {
        [
            (self.alert.clone(), Playback::looped(self.alert_volume)),
            (self.voice.clone(), Playback::ONCE),
            (self.siren.clone(), Playback::looped(self.siren_volume)),
        ]
    }
}

/// Escalation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Armed → warned.
    pub warning_delay_ms: u64,
    /// Warned → fired.
    pub blackout_delay_ms: u64,
    /// Blackout → reveal media.
    pub reveal_delay_ms: u64,
    pub cues: EscalationCues,
    pub copy: WarningCopy,
}

fn default_copy() -> WarningCopy {
    WarningCopy {
        title: "SYSTEM ALERT".to_owned(),
        main: "WARNING".to_owned(),
        sub: "Intrusion detected. Connection compromised in 00:08.".to_owned(),
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            warning_delay_ms: 15_000,
            blackout_delay_ms: 8_000,
            reveal_delay_ms: 600,
            cues: EscalationCues::default(),
            copy: default_copy(),
        }
    }
}

impl EscalationConfig {
    #[must_use]
    pub fn warning_delay(&self) -> Duration {
        Duration::from_millis(self.warning_delay_ms)
    }

    #[must_use]
    pub fn blackout_delay(&self) -> Duration {
        Duration::from_millis(self.blackout_delay_ms)
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_remaining_defaults() {
        let yaml = "warning_delay_ms: 3000\ncues:\n  siren: klaxon\n";

        let config: EscalationConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.warning_delay(), Duration::from_secs(3));
        assert_eq!(config.blackout_delay(), Duration::from_secs(8));
        assert_eq!(config.cues.siren, CueId::new("klaxon"));
        assert_eq!(config.cues.alert, CueId::new("alert_sfx"));
        assert_eq!(config.copy.title, "SYSTEM ALERT");
    }
}
