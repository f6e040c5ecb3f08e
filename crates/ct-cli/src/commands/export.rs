//! Implementation of the `ct export` command.
//!
//! Writes every stored entry as a JSON array to stdout, oldest first.

use std::io::{BufWriter, Write, stdout};

use anyhow::{Context, Result};
use ct_core::CoffeeEntry;
use ct_db::Database;

/// Runs the export command.
pub fn run(db: &Database) -> Result<()> {
    let entries = db.load_entries().context("failed to load entries")?;
    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_entries(&mut writer, &entries)?;
    // Broken pipe (e.g. `ct export | head`) is not an error.
    if writer.flush().is_err() {
        tracing::debug!("stdout closed during export");
    }
    Ok(())
}

/// Serializes entries as a pretty JSON array followed by a newline.
pub fn write_entries<W: Write>(writer: &mut W, entries: &[CoffeeEntry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, entries).context("failed to serialize entries")?;
    writeln!(writer).context("failed to write output")?;
    Ok(())
}
