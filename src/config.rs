//! Persistent settings
//!
//! Stores the default option set and user presets in
//! ~/.config/namescrub/config.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cleaner::{self, OptionSet};
use crate::error::ScrubResult;

const CONFIG_VERSION: u32 = 1;

/// Persistent user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Config format version
    pub version: u32,
    /// Options used when no preset or flags are given
    pub defaults: OptionSet,
    /// User-defined presets, shadowing built-ins of the same name
    pub presets: BTreeMap<String, OptionSet>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            defaults: OptionSet::default(),
            presets: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;

        if !path.exists() {
            debug!("No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {:?}", path))?;

        debug!("Loaded config with {} user presets", settings.presets.len());
        Ok(settings)
    }

    /// Save settings to `path`, or to the default location
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        debug!("Saved config to {}", path.display());
        Ok(path)
    }

    /// Resolve a preset, preferring user presets over built-ins
    pub fn preset(&self, name: &str) -> ScrubResult<OptionSet> {
        match self.presets.get(name.trim()) {
            Some(options) => Ok(*options),
            None => cleaner::preset(name),
        }
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("namescrub").join("config.json"))
    }
}
