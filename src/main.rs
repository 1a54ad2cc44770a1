// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Busdesk CLI - back-office editing for page layouts and bus seat maps

use anyhow::Result;
use busdesk::commands::{self, seats::SeatArgs, Context};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "busdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "BUSDESK_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "BUSDESK_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage page layouts and the order of their components
    Layout {
        /// Action: list, show, activate, deactivate, edit, move, status, save, discard, hide, unhide, set
        action: String,

        /// Layout id
        id: Option<u64>,

        /// Action arguments (move: FROM TO, hide/unhide: PLACEMENT, set: PLACEMENT FIELD VALUE)
        args: Vec<String>,
    },

    /// Design bus seat maps
    Seats {
        /// Action: show, init, paint, number, label, resize, save, discard
        action: String,

        /// Bus id
        bus: Option<u64>,

        /// Action arguments (paint: ROW COL, label: ROW COL LABEL, resize: ROWS COLS)
        args: Vec<String>,

        /// Grid rows for init
        #[arg(long)]
        rows: Option<u32>,

        /// Grid columns for init
        #[arg(long)]
        cols: Option<u32>,

        /// Brush for paint (seat, aisle, door, stairs, driver)
        #[arg(long)]
        brush: Option<String>,

        /// Seat class for paint (standard, vip)
        #[arg(long)]
        class: Option<String>,
    },

    /// Block seats on a trip
    Trip {
        /// Action: seats, block
        action: String,

        /// Trip id
        trip: u64,

        /// Seat labels to toggle
        labels: Vec<String>,
    },

    /// Show configuration
    Config {
        /// Configuration key (e.g. remote.backend)
        key: Option<String>,

        /// Print the whole resolved configuration
        #[arg(long)]
        show: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        return commands::completions::run(shell, &mut Cli::command());
    }

    let mut config = busdesk::config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let ctx = Context {
        config,
        color: !cli.no_color,
        json: cli.json,
    };

    // Execute command
    match cli.command {
        Commands::Layout { action, id, args } => {
            commands::layout::run(&ctx, &action, id, &args)
        }
        Commands::Seats { action, bus, args, rows, cols, brush, class } => {
            commands::seats::run(&ctx, &action, bus, &args, SeatArgs { rows, cols, brush, class })
        }
        Commands::Trip { action, trip, labels } => {
            commands::trip::run(&ctx, &action, trip, &labels)
        }
        Commands::Config { key, show } => {
            commands::config::run(&ctx, key.as_deref(), show)
        }
        Commands::Completions { .. } => Ok(()),
    }
}
