// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod layout;
pub mod seats;
pub mod trip;

use crate::config::{Backend, Config};
use crate::editor::Workspace;
use crate::notify::TracingNotifier;
use crate::remote::{FileStore, RemoteStore, RestStore};
use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use std::str::FromStr;
use std::time::Duration;

/// Resolved settings shared by every command
pub struct Context {
    /// Resolved configuration
    pub config: Config,
    /// Whether to colour output
    pub color: bool,
    /// Whether to print JSON instead of text
    pub json: bool,
}

impl Context {
    /// Workspace over the configured data service
    pub fn workspace(&self) -> Result<Workspace> {
        let remote = open_remote(&self.config)?;
        Ok(Workspace::new(remote, Box::new(TracingNotifier)))
    }

    /// Success marker text
    #[must_use]
    pub fn good(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Attention marker text
    #[must_use]
    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    /// De-emphasised text
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
        Ok(())
    }
}

/// Open the data service named by the configuration
pub fn open_remote(config: &Config) -> Result<Box<dyn RemoteStore>> {
    match config.remote.backend {
        Backend::File => {
            tracing::debug!("Using file store in {}", config.data_dir.display());
            Ok(Box::new(FileStore::new(&config.data_dir)))
        }
        Backend::Rest => {
            let url = config
                .remote
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("remote.url is required for the rest backend"))?;
            let api_key = config
                .remote
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("remote.api_key is required for the rest backend"))?;
            let timeout = config.remote.timeout_secs.map(Duration::from_secs);
            tracing::debug!("Using REST store at {}", url);
            Ok(Box::new(RestStore::new(url, api_key, timeout)?))
        }
    }
}

/// Parse the positional argument at `index`
pub(crate) fn arg<T>(args: &[String], index: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = args
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("{} is required", name))?;
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", name, raw, e))
}

/// Convert a 1-based position from the command line to an index
pub(crate) fn position(args: &[String], index: usize, name: &str) -> Result<usize> {
    let value: usize = arg(args, index, name)?;
    value
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("{} is 1-based, got 0", name))
}

/// Require an id argument
pub(crate) fn require_id(id: Option<u64>, what: &str) -> Result<u64> {
    id.ok_or_else(|| anyhow::anyhow!("{} id is required", what))
}
