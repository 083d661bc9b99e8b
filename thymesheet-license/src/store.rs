//! File-backed license record storage.
//!
//! The record lives in a single JSON file. The file is the only copy; nothing
//! is cached in memory between calls.

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "ThymeSheet";
const LICENSE_FILE: &str = "license.json";

/// Reads and writes the license record file.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    path: PathBuf,
}

impl LicenseStore {
    /// Uses the record file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The well-known location under the user's documents folder, falling
    /// back to the home directory and then the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(LICENSE_FILE)
    }

    /// Returns the record file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`LicenseError::RecordCorrupted`] if the file is not a valid record,
    /// [`LicenseError::PersistenceFailure`] if it cannot be read.
    pub fn load(&self) -> LicenseResult<Option<LicenseRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "License record is corrupted");
            LicenseError::RecordCorrupted(e.to_string())
        })
    }

    /// Replaces the whole record file, creating its directory if needed.
    ///
    /// The record is written to a sibling temp file and renamed into place so
    /// readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// [`LicenseError::PersistenceFailure`] on any I/O failure.
    pub fn save(&self, record: &LicenseRecord) -> LicenseResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_vec_pretty(record).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "License record saved");
        Ok(())
    }
}

impl Default for LicenseStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}
