//! Derived license state.

use crate::error::{LicenseError, LicenseResult};
use crate::features::Tier;
use serde::{Deserialize, Serialize};

/// Why a stored license was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Stored key does not match the key grammar.
    MalformedKey,
    /// Stored key has a bad checksum.
    Checksum,
    /// Stored key is bound to another machine.
    HardwareMismatch,
}

/// The license state of this installation. Recomputed on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierState {
    /// No license record yet; the user should start a trial or enter a key.
    New,
    /// A record exists but cannot be trusted.
    Invalid(InvalidReason),
    /// Valid premium license.
    Premium,
    /// Trial inside its window.
    Trial {
        /// Whole days left, never less than one.
        days_remaining: u32,
    },
    /// Trial past its window.
    TrialExpired,
    /// License state could not be read; running restricted.
    Free,
    /// The record is unreadable as structured data.
    Error,
}

impl TierState {
    /// Returns the access tier granted by this state.
    #[must_use]
    pub fn tier(&self) -> Tier {
        match self {
            Self::Premium | Self::Trial { .. } => Tier::Premium,
            _ => Tier::Free,
        }
    }

    /// Stable lowercase name of the state.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Invalid(_) => "invalid",
            Self::Premium => "premium",
            Self::Trial { .. } => "trial",
            Self::TrialExpired => "trial_expired",
            Self::Free => "free",
            Self::Error => "error",
        }
    }

    /// Returns the trial days left, if this is an active trial.
    #[must_use]
    pub fn days_remaining(&self) -> Option<u32> {
        match self {
            Self::Trial { days_remaining } => Some(*days_remaining),
            _ => None,
        }
    }

    /// Returns true if the user has never activated this installation.
    #[must_use]
    pub fn needs_activation(&self) -> bool {
        matches!(self, Self::New)
    }

    /// Human-readable description of the state.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::New => "No license found. Start a free trial or enter a license key.".into(),
            Self::Invalid(InvalidReason::HardwareMismatch) => {
                "This license is registered to a different computer.".into()
            }
            Self::Invalid(_) => "The stored license key is not valid.".into(),
            Self::Premium => "Premium license active.".into(),
            Self::Trial { days_remaining: 1 } => "Trial active: 1 day remaining.".into(),
            Self::Trial { days_remaining } => {
                format!("Trial active: {days_remaining} days remaining.")
            }
            Self::TrialExpired => "Your trial has expired. Upgrade to keep premium features.".into(),
            Self::Free => "License could not be checked. Running with free features.".into(),
            Self::Error => "License file is damaged. Running with free features.".into(),
        }
    }
}

/// Outcome of an activation, shaped for host bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub state: TierState,
    pub tier: Tier,
    pub message: String,
}

impl ActivationResult {
    /// Builds a result from an activation outcome. On failure `current` is
    /// the state the installation is left in.
    pub fn from_outcome(
        outcome: LicenseResult<TierState>,
        current: impl FnOnce() -> TierState,
    ) -> Self {
        let (state, error) = match outcome {
            Ok(state) => (state, None),
            Err(e) => (current(), Some(e)),
        };
        Self {
            success: error.is_none(),
            error_code: error.as_ref().map(|e: &LicenseError| e.code().to_string()),
            error: error.map(|e| e.to_string()),
            tier: state.tier(),
            message: state.message(),
            state,
        }
    }
}
