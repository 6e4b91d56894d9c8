//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::infra::default_ignored;
use crate::watch::DEFAULT_DEBOUNCE;

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default workspace directory
    pub dir: Option<PathBuf>,

    /// Debounce for changed notes while serving, in milliseconds
    pub debounce_ms: Option<u64>,

    /// Directory names to skip in addition to the built-in list
    pub ignore: Vec<String>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/roamlinks/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roamlinks")
            .join("config.toml")
    }

    /// Resolve the workspace directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. Current working directory
    pub fn notes_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the debounce delay: CLI flag, then config, then 500 ms.
    pub fn debounce(&self, cli_ms: Option<u64>) -> Duration {
        cli_ms
            .or(self.debounce_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// Built-in ignored directory names plus any configured extras.
    pub fn ignored(&self) -> Vec<String> {
        let mut ignored = default_ignored();
        for name in &self.ignore {
            if !ignored.contains(name) {
                ignored.push(name.clone());
            }
        }
        ignored
    }
}
