//! Application settings, read from an optional `study-tracker.toml`.
//!
//! Every field has a default, so a missing or partial file is fine.
//! `STUDY_TRACKER_DB` overrides the database path.

use crate::error::StorageError;
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "study-tracker.toml";
pub const DB_PATH_ENV: &str = "STUDY_TRACKER_DB";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("db.sqlite3"),
            window_width: 500.0,
            window_height: 700.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: StorageError,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Builds the config from file contents and the database override, if any.
    pub fn resolve(file: Option<&str>, db_override: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(text) => toml::from_str(text)?,
            None => Config::default(),
        };
        if let Some(path) = db_override.filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        Ok(config)
    }

    /// Reads `path` if it exists and applies the environment override.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            info!("Loaded settings from {}", path.display());
            Some(text)
        } else {
            None
        };
        Self::resolve(text.as_deref(), std::env::var(DB_PATH_ENV).ok())
    }
}
