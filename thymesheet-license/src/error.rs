//! Error types for the licensing module.

use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Key does not match the `THYME-XXXX-XXXX-XXXX` grammar.
    #[error("invalid license key format: {0}")]
    MalformedKey(String),

    /// Key is well-formed but its checksum segment does not match.
    #[error("license key checksum invalid")]
    InvalidChecksum,

    /// Stored license belongs to a different machine.
    #[error("license is bound to a different machine")]
    HardwareMismatch,

    /// The same key is already activated on another machine.
    #[error("license key is already activated on another machine")]
    AlreadyActivatedElsewhere,

    /// The persisted license record could not be parsed.
    #[error("license record corrupted: {0}")]
    RecordCorrupted(String),

    /// No trial key could be drawn from the bundled pool.
    #[error("no trial keys available")]
    PoolExhausted,

    /// I/O error while reading or writing license state.
    #[error("storage error: {0}")]
    PersistenceFailure(#[from] std::io::Error),
}

impl LicenseError {
    /// Stable machine-readable code for host bridges.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedKey(_) => "malformed_key",
            Self::InvalidChecksum => "invalid_checksum",
            Self::HardwareMismatch => "hardware_mismatch",
            Self::AlreadyActivatedElsewhere => "already_activated_elsewhere",
            Self::RecordCorrupted(_) => "record_corrupted",
            Self::PoolExhausted => "pool_exhausted",
            Self::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
