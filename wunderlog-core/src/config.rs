use anyhow::{Context, Result, anyhow};
use chrono::TimeDelta;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::collector::WunderlogOptions;

/// Optional settings stored on disk. Anything left out keeps its built-in
/// default.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// directory = "/var/lib/wunderlog"
/// cache_ttl_minutes = 55
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Overrides the `.netrc` lookup.
    pub api_key: Option<String>,
    pub directory: Option<PathBuf>,
    pub base_url: Option<String>,
    /// `0` disables the response cache.
    pub cache_ttl_minutes: Option<i64>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "wunderground", "wunderlog")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Collector options with this config applied over the defaults.
    pub fn options(&self) -> Result<WunderlogOptions> {
        let mut options = WunderlogOptions::default();

        if let Some(key) = &self.api_key {
            options.api_key = Some(key.clone());
        }
        if let Some(directory) = &self.directory {
            options.directory = directory.clone();
        }
        if let Some(base_url) = &self.base_url {
            options.base_url = base_url.clone();
        }
        if let Some(minutes) = self.cache_ttl_minutes {
            options.cache_ttl = TimeDelta::try_minutes(minutes)
                .filter(|ttl| *ttl >= TimeDelta::zero())
                .ok_or_else(|| anyhow!("cache_ttl_minutes out of range: {minutes}"))?;
        }

        Ok(options)
    }
}
