//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Caffeine tracker.
///
/// Logs coffee and estimates how much caffeine is active in your body,
/// with advisories for the post-wake cortisol window and the pre-bed sleep window.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a drink.
    Log(LogArgs),

    /// Remove a logged drink by ID (or unique ID prefix).
    Remove {
        /// Entry ID as shown by `ct list`.
        id: String,
    },

    /// List logged drinks, newest first.
    List {
        /// Day to list (YYYY-MM-DD, "today", "yesterday"). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show active and consumed caffeine for today.
    Status {
        /// Evaluate at this time instead of now (ISO 8601 or "2 hours ago").
        #[arg(long)]
        at: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the active caffeine curve for a day.
    Curve {
        /// Day to plot (YYYY-MM-DD, "today", "yesterday"). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Minutes between samples.
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=1440))]
        step_minutes: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known drinks and milk options.
    Catalog,

    /// Write all entries to stdout as a JSON array.
    Export,

    /// Read a JSON array of entries from stdin.
    Import,
}

/// Arguments for `ct log`.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Drink name (see `ct catalog`).
    pub drink: String,

    /// Milk added (e.g., "Whole Milk"). Defaults to none.
    #[arg(long)]
    pub milk: Option<String>,

    /// Volume in milliliters. Required for drinks not in the catalog.
    #[arg(long)]
    pub volume: Option<f64>,

    /// Caffeine in milligrams before milk. Required for drinks not in the catalog.
    #[arg(long)]
    pub caffeine: Option<f64>,

    /// When the drink was consumed (ISO 8601 or "30 minutes ago"). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}
