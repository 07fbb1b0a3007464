//! The unlock ledger: fragment id → unlocked flag.

use std::collections::BTreeMap;

use memarchive_core::event::{Badge, ProgressSnapshot};
use memarchive_core::ids::FragmentId;
use serde::{Deserialize, Serialize};

/// Durable record of unlocked fragments.
///
/// Stored as a JSON object `{"fragment-1": true, ...}`. Keys that do not name
/// a configured fragment are kept but never counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLedger {
    flags: BTreeMap<String, bool>,
}

impl ProgressLedger {
    /// Decodes a stored record. A JSON `null` decodes to an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if `raw` is not an object of booleans.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let flags: Option<BTreeMap<String, bool>> = serde_json::from_str(raw)?;
        Ok(Self {
            flags: flags.unwrap_or_default(),
        })
    }

    /// Encodes the ledger as its stored record.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serialization of a string-keyed map of booleans is infallible.
        serde_json::to_string(&self.flags).expect("ledger serialization is infallible")
    }

    /// Whether `fragment` has been unlocked.
    #[must_use]
    pub fn is_unlocked(&self, fragment: FragmentId) -> bool {
        self.flags
            .get(&fragment.to_string())
            .copied()
            .unwrap_or(false)
    }

    /// Sets the flag for `fragment`. Returns `true` if it was not already set.
    pub fn unlock(&mut self, fragment: FragmentId) -> bool {
        if self.is_unlocked(fragment) {
            return false;
        }
        self.flags.insert(fragment.to_string(), true);
        true
    }

    /// Number of `fragments` that are unlocked.
    #[must_use]
    pub fn unlocked_count(&self, fragments: &[FragmentId]) -> usize {
        fragments.iter().filter(|f| self.is_unlocked(**f)).count()
    }

    /// Computes the progress widgets for a story made of `fragments`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn snapshot(&self, fragments: &[FragmentId]) -> ProgressSnapshot {
        let unlocked = self.unlocked_count(fragments);
        let total = fragments.len();
        let ratio = if total == 0 {
            1.0
        } else {
            unlocked as f64 / total as f64
        };
        let glitch_intensity = (1.0 - ratio).clamp(0.0, 1.0);
        let glitch_period_ms = (200.0 + 1800.0 * (1.0 - glitch_intensity)).round() as u32;

        ProgressSnapshot {
            unlocked,
            total,
            ratio,
            badges: fragments
                .iter()
                .map(|&fragment| Badge {
                    fragment,
                    unlocked: self.is_unlocked(fragment),
                })
                .collect(),
            finale_ready: unlocked >= total,
            glitch_intensity,
            glitch_period_ms,
        }
    }
}
