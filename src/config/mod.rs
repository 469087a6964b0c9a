//! Settings - JSON file with environment and command-line overrides
//!
//! Resolution order for the catalog path, last one wins:
//! default, settings file, `CUTSPEED_CATALOG`, `--catalog`.

use crate::handbook::CuttingSpeedMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "cutspeed.json";
pub const CATALOG_ENV: &str = "CUTSPEED_CATALOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read settings {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Catalog file, `.csv` or `.xlsx`
    pub catalog: PathBuf,
    /// Speed mode used when a command does not name one
    pub mode: CuttingSpeedMode,
    /// Log filter used when RUST_LOG is unset
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/cutting_data.csv"),
            mode: CuttingSpeedMode::Mean,
            log: "warn".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Explicit file if given, else `cutspeed.json` when present, else defaults.
    /// Then applies `CUTSPEED_CATALOG`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_SETTINGS_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_catalog_override(std::env::var_os(CATALOG_ENV).map(PathBuf::from));
        Ok(settings)
    }

    pub fn apply_catalog_override(&mut self, catalog: Option<PathBuf>) {
        if let Some(path) = catalog.filter(|p| !p.as_os_str().is_empty()) {
            self.catalog = path;
        }
    }
}
