// SPDX-License-Identifier: AGPL-3.0-or-later
//! `config.toml` loading

use anyhow::{Context, Result};
use onlynote_core::StyleConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const APP_NAME: &str = "onlynote";
const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_FILE_NAME: &str = "store.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Autosave store location; defaults to the platform data directory
    pub store_path: Option<PathBuf>,
    pub autosave_debounce_ms: u64,
    pub style: StyleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            autosave_debounce_ms: 500,
            style: StyleConfig::default(),
        }
    }
}

impl Config {
    /// Load `explicit`, or the platform config file if there is one.
    ///
    /// An explicit path must exist and parse. The platform file is optional
    /// and a broken one falls back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let Some(path) = default_config_path() else {
            debug!("no platform config directory, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        match Self::from_file(&path) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Ok(Self::default())
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Store file to use, `None` if no location can be determined
    pub fn resolve_store_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_NAME).join(STORE_FILE_NAME)))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}
