//! Keyed checksum embedded in every license key.
//!
//! The checksum is the first four characters of the uppercase hex SHA-256
//! digest of `secret ∥ segments`, with no separator. Tiered keys hash the
//! payload segment only; legacy keys hash both payload segments.

use crate::key::LicenseKey;
use sha2::{Digest, Sha256};

/// Shared secret baked into key generation and verification.
pub const LICENSE_SECRET: &str = "ThymeSheetSecretKey2024!";

/// Number of digest characters kept in the key.
pub const CHECKSUM_LEN: usize = 4;

/// Computes the checksum for the given payload segments.
#[must_use]
pub fn expected_checksum(secret: &str, segments: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    for segment in segments {
        hasher.update(segment.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    digest[..CHECKSUM_LEN].to_ascii_uppercase()
}

/// Returns true if `key` parses and its checksum matches under `secret`.
#[must_use]
pub fn verify_with_secret(key: &str, secret: &str) -> bool {
    LicenseKey::parse(key)
        .map(|parsed| checksum_matches(&parsed, secret))
        .unwrap_or(false)
}

/// Returns true if `key` parses and carries a valid checksum.
#[must_use]
pub fn verify(key: &str) -> bool {
    verify_with_secret(key, LICENSE_SECRET)
}

/// Checks an already-parsed key against `secret`.
#[must_use]
pub fn checksum_matches(key: &LicenseKey, secret: &str) -> bool {
    let expected = expected_checksum(secret, &key.checksum_input());
    expected == key.checksum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiered_checksum_ignores_kind_tag() {
        assert_eq!(expected_checksum(LICENSE_SECRET, &["AB12"]), "BA54");
    }

    #[test]
    fn segments_are_concatenated_without_separator() {
        assert_eq!(
            expected_checksum(LICENSE_SECRET, &["AB12", "CD34"]),
            expected_checksum(LICENSE_SECRET, &["AB12CD34"])
        );
    }

    #[test]
    fn different_secret_changes_checksum() {
        assert_ne!(
            expected_checksum("other-secret", &["AB12"]),
            expected_checksum(LICENSE_SECRET, &["AB12"])
        );
    }
}
