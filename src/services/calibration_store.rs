//! Persistence of the calibration scaling factor.
//!
//! The file holds a single JSON object, `{"scaling_factor": <float>}`. A
//! missing, unreadable or malformed file means "not calibrated"; loading
//! never fails.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::CalibrationState;

/// Reads and writes the persisted calibration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the calibration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted calibration.
    ///
    /// Returns `None` when the file is absent, cannot be parsed, or holds a
    /// factor that is not finite and positive.
    #[must_use]
    pub fn load(&self) -> Option<CalibrationState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No calibration file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    "Failed to read calibration file {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_str::<CalibrationState>(&content) {
            Ok(state) if state.is_valid() => Some(state),
            Ok(state) => {
                warn!(
                    "Ignoring calibration file {}: unusable scaling factor {}",
                    self.path.display(),
                    state.scaling_factor
                );
                None
            }
            Err(e) => {
                warn!(
                    "Ignoring malformed calibration file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Persists `state`, replacing any previous value.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self, state: &CalibrationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create calibration directory: {}",
                parent.display()
            ))?;
        }

        let content =
            serde_json::to_string_pretty(state).context("Failed to serialize calibration")?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp calibration file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &self.path).context(format!(
            "Failed to rename temp calibration file to: {}",
            self.path.display()
        ))?;

        Ok(())
    }
}
