//! Caffeine tracker CLI library.
//!
//! This crate provides the CLI interface for the caffeine tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, LogArgs};
pub use config::Config;
