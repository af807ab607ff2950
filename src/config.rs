//! Storage configuration.
//!
//! Resolution order for the storage path:
//! - `EVOLVING_IDEAS_STORAGE`
//! - `storage_path` in the YAML config file (`EVOLVING_IDEAS_CONFIG`, default
//!   `<data dir>/config.yaml`)
//! - `<data dir>/ideas`, or `.storage/ideas` when no data dir can be found

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{IdeaError, Result};

const APP_NAME: &str = "evolving-ideas";
const CONFIG_FILE: &str = "config.yaml";
const STORAGE_ENV: &str = "EVOLVING_IDEAS_STORAGE";
const CONFIG_ENV: &str = "EVOLVING_IDEAS_CONFIG";

/// Caller-owned settings handed to [`crate::IdeaRepository::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub storage_path: PathBuf,
}

/// Shape of the optional config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    storage_path: Option<PathBuf>,
}

impl Config {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    /// Resolve configuration from the environment and the config file.
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            std::env::var_os(STORAGE_ENV).map(PathBuf::from),
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        )
    }

    fn resolve(storage_override: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = storage_override {
            return Ok(Self::new(path));
        }

        let data_dir = default_data_dir();
        let config_path = config_path.unwrap_or_else(|| data_dir.join(CONFIG_FILE));
        if let Some(path) = load_file(&config_path)?.storage_path {
            tracing::debug!(config = %config_path.display(), "storage path from config file");
            return Ok(Self::new(path));
        }

        Ok(Self::new(data_dir.join("ideas")))
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = fs::read_to_string(path).map_err(|e| IdeaError::io(path, e))?;
    if text.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".storage"))
}
