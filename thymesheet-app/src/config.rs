//! Runtime configuration.
//!
//! Only file locations are configurable. The trial length, key secret and
//! feature table are compiled in.

use std::env;
use std::path::{Path, PathBuf};
use thymesheet_license::{EntitlementEngine, LicenseStore, KEY_POOL_FILE};

/// File locations used by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// License record file.
    pub license_file: PathBuf,
    /// Bundled trial key pool.
    pub key_pool: PathBuf,
}

impl AppConfig {
    /// Builds a config, filling unset paths with the defaults.
    #[must_use]
    pub fn new(license_file: Option<PathBuf>, key_pool: Option<PathBuf>) -> Self {
        Self {
            license_file: license_file.unwrap_or_else(LicenseStore::default_path),
            key_pool: key_pool.unwrap_or_else(Self::default_key_pool),
        }
    }

    /// The pool file shipped next to the executable.
    #[must_use]
    pub fn default_key_pool() -> PathBuf {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(KEY_POOL_FILE)
    }

    /// Builds the entitlement engine for these paths.
    #[must_use]
    pub fn engine(&self) -> EntitlementEngine {
        EntitlementEngine::new(LicenseStore::new(&self.license_file)).with_pool_file(&self.key_pool)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}
