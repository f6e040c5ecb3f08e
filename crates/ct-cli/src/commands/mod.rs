//! CLI subcommand implementations.

pub mod catalog;
pub mod curve;
pub mod export;
pub mod import;
pub mod list;
pub mod log;
pub mod remove;
pub mod status;
mod util;
