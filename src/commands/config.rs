// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - inspect the resolved configuration

use super::Context;
use anyhow::Result;

/// Print one setting, or the whole configuration as TOML
pub fn run(ctx: &Context, key: Option<&str>, show: bool) -> Result<()> {
    match key {
        Some(key) if !show => println!("{}", ctx.config.get(key)?),
        _ => print!("{}", ctx.config.to_toml()?),
    }
    Ok(())
}
