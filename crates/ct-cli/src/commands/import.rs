//! Import command for loading exported entries into the local `SQLite` store.

use std::io::{self, Read};

use anyhow::{Context, Result};
use ct_core::CoffeeEntry;
use ct_db::Database;

/// Reads a JSON array from stdin and stores new entries. Returns the inserted count.
pub fn run(db: &mut Database) -> Result<usize> {
    let entries = parse_entries(io::stdin().lock())?;
    let inserted = db
        .add_entries(&entries)
        .context("failed to store imported entries")?;
    tracing::debug!(read = entries.len(), inserted, "import finished");
    Ok(inserted)
}

/// Parses and validates an exported entry array.
pub fn parse_entries<R: Read>(reader: R) -> Result<Vec<CoffeeEntry>> {
    let entries: Vec<CoffeeEntry> =
        serde_json::from_reader(reader).context("invalid JSON: expected an array of entries")?;
    for (idx, entry) in entries.iter().enumerate() {
        entry
            .validate()
            .with_context(|| format!("invalid entry at index {idx} ({})", entry.id))?;
    }
    Ok(entries)
}
