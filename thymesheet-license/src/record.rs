//! The persisted license record.

use crate::device::HardwareId;
use crate::key::KeyKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The license type stored alongside the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Trial,
    Premium,
}

impl From<KeyKind> for LicenseType {
    fn from(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Trial => Self::Trial,
            KeyKind::Premium => Self::Premium,
        }
    }
}

/// One installation's license state. Field names match the JSON file
/// written by earlier releases, which carries no version field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// The activated key, as entered.
    pub license_key: String,
    /// Stored type; absent in records written before types existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
    /// Machine the key is bound to.
    pub hardware_id: HardwareId,
    /// First activation on this installation. Kept across upgrades.
    pub activated_at: DateTime<Utc>,
    /// End of the trial window, for trial activations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// Last time a key was applied over an existing record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_at: Option<DateTime<Utc>>,
}
