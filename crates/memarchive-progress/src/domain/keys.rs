//! Record keys under which the archive persists its state.

use serde::Deserialize;

/// Storage keys for every persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Unlock ledger.
    pub progress: String,
    /// Selected palette.
    pub theme: String,
    /// Boot sequence completed flag.
    pub boot: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            progress: "ma2089_seen".to_owned(),
            theme: "ma2089_theme".to_owned(),
            boot: "ma2089_booted".to_owned(),
        }
    }
}
