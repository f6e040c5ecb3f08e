//! Remove command for deleting a logged drink.

use anyhow::{Context, Result};
use ct_core::CoffeeEntry;
use ct_db::Database;

/// Runs the remove command. Accepts a full ID or a unique prefix.
pub fn run(db: &mut Database, id: &str) -> Result<()> {
    let entry = resolve(db, id)?;
    let removed = db
        .remove_entry(&entry.id)
        .context("failed to remove entry")?;
    if !removed {
        anyhow::bail!("entry {} was already removed", entry.id);
    }
    tracing::debug!(id = %entry.id, "entry removed");
    println!(
        "Removed {} ({:.1} mg) logged at {}",
        entry.drink_type,
        entry.effective_caffeine_mg,
        entry.consumed_at.to_rfc3339()
    );
    Ok(())
}

/// Finds the single entry matching `id` exactly or by prefix.
pub fn resolve(db: &Database, id: &str) -> Result<CoffeeEntry> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("entry ID cannot be empty");
    }
    let mut matches = db.find_by_id_prefix(id)?;
    if let Some(pos) = matches.iter().position(|e| e.id.as_str() == id) {
        return Ok(matches.swap_remove(pos));
    }
    match matches.len() {
        0 => anyhow::bail!("no entry matches '{id}'"),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("'{id}' is ambiguous ({n} entries match); use more characters"),
    }
}
