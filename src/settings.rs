//! Game settings
//!
//! Read from a JSON file next to the game. Every field has a default, so a
//! partial file only overrides what it names.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::platform::time::{DEFAULT_MAX_FRAME_DELTA, DEFAULT_MAX_SUBSTEPS, FixedStep};

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "ranger-run.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `level1.txt` … `level10.txt`
    pub levels_dir: PathBuf,
    /// High score ledger file
    pub scores_path: PathBuf,
    /// Log output file (the terminal is busy drawing the arena)
    pub log_file: Option<PathBuf>,

    // === Frame pacing ===
    /// Longest frame delta fed to the tick driver
    pub max_frame_delta_ms: u64,
    /// Maximum ticks run for a single frame
    pub max_substeps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            levels_dir: PathBuf::from("levels"),
            scores_path: PathBuf::from("highscores.json"),
            log_file: Some(PathBuf::from("ranger-run.log")),

            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA.as_millis() as u64,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let settings = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Tick driver configured from these settings
    pub fn driver(&self) -> FixedStep {
        FixedStep::new(
            FixedStep::default().step(),
            Duration::from_millis(self.max_frame_delta_ms),
            self.max_substeps,
        )
    }
}
