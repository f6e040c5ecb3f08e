use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{catalog, curve, export, import, list, log, remove, status};
use ct_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ct_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ct_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output on stdout stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Log(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            log::run(&mut db, &config, args)?;
        }
        Some(Commands::Remove { id }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            remove::run(&mut db, id)?;
        }
        Some(Commands::List { date, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            list::run(&db, date.as_deref(), *json)?;
        }
        Some(Commands::Status { at, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&db, &config, at.as_deref(), *json)?;
        }
        Some(Commands::Curve {
            date,
            step_minutes,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            curve::run(&db, &config, date.as_deref(), *step_minutes, *json)?;
        }
        Some(Commands::Catalog) => {
            // No database needed
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            catalog::run(&config);
        }
        Some(Commands::Export) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            export::run(&db)?;
        }
        Some(Commands::Import) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let inserted = import::run(&mut db)?;
            println!("Imported {inserted} entries");
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
