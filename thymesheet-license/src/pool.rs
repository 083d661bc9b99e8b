//! Pre-generated trial keys shipped with the installer.
//!
//! The pool file is a JSON document `{ "keys": ["THYME-TRIL-...", ...] }`.
//! It is read-only at runtime.

use crate::checksum::LICENSE_SECRET;
use crate::error::{LicenseError, LicenseResult};
use crate::key::KeyKind;
use crate::keygen::generate_key;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// File name of the bundled pool next to the executable.
pub const KEY_POOL_FILE: &str = "trial-keys.json";

/// A static pool of trial keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPool {
    keys: Vec<String>,
}

impl KeyPool {
    /// Wraps an in-memory key list.
    #[must_use]
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Parses a pool document.
    ///
    /// # Errors
    ///
    /// [`LicenseError::PoolExhausted`] if the document is not a pool.
    pub fn from_json(bytes: &[u8]) -> LicenseResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            warn!(error = %e, "Trial key pool is unreadable");
            LicenseError::PoolExhausted
        })
    }

    /// Reads the pool file at `path`.
    ///
    /// # Errors
    ///
    /// [`LicenseError::PoolExhausted`] if the file is missing or unreadable.
    pub fn load(path: &Path) -> LicenseResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Trial key pool not found");
            LicenseError::PoolExhausted
        })?;
        Self::from_json(&bytes)
    }

    /// Generates `count` fresh trial keys.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let keys = (0..count)
            .map(|_| generate_key(KeyKind::Trial, LICENSE_SECRET, rng).to_string())
            .collect();
        Self { keys }
    }

    /// Serializes the pool as a pretty-printed document.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from(r#"{"keys":[]}"#))
    }

    /// Returns the keys in the pool.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of keys in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the pool has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Picks a key uniformly at random.
    ///
    /// # Errors
    ///
    /// [`LicenseError::PoolExhausted`] if the pool is empty.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> LicenseResult<String> {
        self.keys
            .choose(rng)
            .cloned()
            .ok_or(LicenseError::PoolExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draw_from_empty_pool_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = KeyPool::default().draw(&mut rng).unwrap_err();
        assert!(matches!(err, LicenseError::PoolExhausted));
    }

    #[test]
    fn malformed_document_is_exhausted() {
        assert!(matches!(
            KeyPool::from_json(b"[\"THYME-TRIL-7QX3-3322\"]"),
            Err(LicenseError::PoolExhausted)
        ));
    }

    #[test]
    fn draw_returns_pool_member() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = KeyPool::from_json(br#"{"keys":["A","B","C"]}"#).unwrap();
        for _ in 0..20 {
            let key = pool.draw(&mut rng).unwrap();
            assert!(pool.keys().contains(&key));
        }
    }
}
