//! List command: one day's drinks, newest first.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use ct_core::{CoffeeEntry, DateKey, newest_first};
use ct_db::Database;

use super::util::{format_clock, format_mg, parse_date_key};

/// Runs the list command.
pub fn run(db: &Database, date: Option<&str>, json: bool) -> Result<()> {
    let today = DateKey::for_instant(Utc::now(), &Local);
    let day = parse_date_key(date, today)?;
    let entries = db
        .entries_for_day(&day)
        .with_context(|| format!("failed to load entries for {day}"))?;

    let mut listed: Vec<&CoffeeEntry> = entries.iter().collect();
    newest_first(&mut listed);

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        print!("{}", format_list(day, &listed, &Local));
    }
    Ok(())
}

/// Formats entries as a table.
pub fn format_list<Tz: TimeZone>(day: DateKey, entries: &[&CoffeeEntry], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();

    writeln!(output, "DRINKS: {}", day.date().format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if entries.is_empty() {
        writeln!(output, "No drinks logged.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<5}  {:<18}  {:<12}  {:>8}  ID",
        "Time", "Drink", "Milk", "Caffeine"
    )
    .unwrap();
    writeln!(
        output,
        "─────  ──────────────────  ────────────  ────────  ──────────────────────"
    )
    .unwrap();
    for entry in entries {
        writeln!(
            output,
            "{:<5}  {:<18}  {:<12}  {:>8}  {}",
            format_clock(entry.consumed_at, tz),
            entry.drink_type,
            entry.milk,
            format_mg(entry.effective_caffeine_mg),
            entry.id
        )
        .unwrap();
    }

    output
}
