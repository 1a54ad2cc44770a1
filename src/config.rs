// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Built-in defaults, then an optional TOML file, then `BUSDESK_*`
//! environment variables (`BUSDESK_REMOTE__URL` sets `remote.url`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the config directory when no path is given
pub const CONFIG_FILE: &str = "busdesk.toml";

/// Which data service backs the editors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON dataset in the data directory
    #[default]
    File,
    /// Hosted REST API
    Rest,
}

/// Connection settings for the data service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Backend kind
    #[serde(default)]
    pub backend: Backend,
    /// Base URL of the REST API
    #[serde(default)]
    pub url: Option<String>,
    /// API key sent with every REST request
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout; unbounded when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (file backend dataset)
    pub data_dir: PathBuf,
    /// Directory for cached data (drafts)
    pub cache_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Data service
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        let dirs = project_dirs();
        Self {
            data_dir: dirs
                .as_ref()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".busdesk")),
            cache_dir: dirs
                .as_ref()
                .map(|d| d.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".busdesk/cache")),
            log_level: "info".to_string(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Config {
    /// Look up one setting by dotted key, rendered for display
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "data_dir" => self.data_dir.display().to_string(),
            "cache_dir" => self.cache_dir.display().to_string(),
            "log_level" => self.log_level.clone(),
            "remote.backend" => match self.remote.backend {
                Backend::File => "file".to_string(),
                Backend::Rest => "rest".to_string(),
            },
            "remote.url" => self.remote.url.clone().unwrap_or_default(),
            "remote.api_key" => self
                .remote
                .api_key
                .as_ref()
                .map(|_| "********".to_string())
                .unwrap_or_default(),
            "remote.timeout_secs" => self
                .remote
                .timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
            other => anyhow::bail!(
                "Unknown config key: {}. Valid: data_dir, cache_dir, log_level, remote.backend, remote.url, remote.api_key, remote.timeout_secs",
                other
            ),
        };
        Ok(value)
    }

    /// The resolved configuration as TOML, with the API key masked
    pub fn to_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.remote.api_key.is_some() {
            shown.remote.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown).context("Failed to serialize config")
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hyperpolymath", "busdesk")
}

/// Default location of the config file
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(CONFIG_FILE))
}

/// Load configuration.
///
/// An explicit `path` must exist; the default location is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();
    let mut builder = ::config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
        .set_default("cache_dir", defaults.cache_dir.to_string_lossy().into_owned())?
        .set_default("log_level", defaults.log_level)?;

    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_path() {
                builder = builder.add_source(::config::File::from(path).required(false));
            }
        }
    }

    let settings = builder
        .add_source(
            ::config::Environment::with_prefix("BUSDESK")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to read configuration")?;

    let config: Config = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    tracing::debug!("Loaded config: data_dir={}", config.data_dir.display());
    Ok(config)
}
