//! Log command for recording a drink.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use ct_core::{
    CoffeeCatalog, CoffeeEntry, DaySchedule, MilkTable, ModelConfig, NO_MILK, NewEntry,
    entry_conflicts_with_sleep, is_in_cortisol_window, peak_time,
};
use ct_db::Database;

use super::util::{format_clock, format_mg, parse_datetime};
use crate::{Config, LogArgs};

/// Runs the log command.
pub fn run(db: &mut Database, config: &Config, args: &LogArgs) -> Result<()> {
    let consumed_at = match args.at.as_deref() {
        Some(at) => parse_datetime(at)?,
        None => Utc::now(),
    };
    let entry = build_entry(args, &config.catalog, &config.milk, consumed_at, &Local)?;
    let inserted = db.add_entry(&entry).context("failed to save entry")?;
    if !inserted {
        anyhow::bail!("entry {} already exists", entry.id);
    }
    tracing::debug!(id = %entry.id, "entry logged");

    print!(
        "{}",
        format_logged(&entry, &config.milk, &config.model, &config.schedule, &Local)
    );
    Ok(())
}

/// Builds an entry from command arguments, pre-filling from the catalog.
pub fn build_entry<Tz: TimeZone>(
    args: &LogArgs,
    catalog: &CoffeeCatalog,
    milk: &MilkTable,
    consumed_at: DateTime<Utc>,
    tz: &Tz,
) -> Result<CoffeeEntry> {
    let mut new = match catalog.lookup(&args.drink) {
        Some(drink) => NewEntry::from_catalog(drink, args.milk.clone(), consumed_at),
        None => {
            let (Some(volume_ml), Some(base_caffeine_mg)) = (args.volume, args.caffeine) else {
                anyhow::bail!(
                    "'{}' is not in the catalog; pass --volume and --caffeine (see 'ct catalog')",
                    args.drink
                );
            };
            NewEntry {
                drink_type: args.drink.clone(),
                volume_ml,
                base_caffeine_mg,
                milk: args.milk.clone(),
                consumed_at,
            }
        }
    };
    if let Some(volume) = args.volume {
        new.volume_ml = volume;
    }
    if let Some(caffeine) = args.caffeine {
        new.base_caffeine_mg = caffeine;
    }

    CoffeeEntry::new(new, milk, tz).with_context(|| format!("cannot log '{}'", args.drink))
}

/// Confirmation text for a newly logged entry, including advisories.
pub fn format_logged<Tz: TimeZone>(
    entry: &CoffeeEntry,
    milk: &MilkTable,
    model: &ModelConfig,
    schedule: &DaySchedule,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();
    let milk_note = if entry.milk == NO_MILK {
        String::new()
    } else {
        format!(" with {}", entry.milk)
    };

    writeln!(
        output,
        "Logged {}{milk_note} at {} ({})",
        entry.drink_type,
        format_clock(entry.consumed_at, tz),
        entry.id
    )
    .unwrap();
    writeln!(
        output,
        "  Caffeine: {} ({} before milk)",
        format_mg(entry.effective_caffeine_mg),
        format_mg(entry.base_caffeine_mg)
    )
    .unwrap();
    writeln!(
        output,
        "  Peaks at: {}",
        format_clock(peak_time(entry, milk, model), tz)
    )
    .unwrap();

    let resolved = schedule.resolve(entry.date_key.date(), tz);
    if is_in_cortisol_window(resolved.wake_up, entry.consumed_at, model) {
        writeln!(
            output,
            "  Note: inside the cortisol window after waking; caffeine helps less now."
        )
        .unwrap();
    }
    if entry_conflicts_with_sleep(entry, resolved.bed_time, model) {
        writeln!(
            output,
            "  Note: still active within {}h of bed time ({}).",
            model.sleep_window_hours,
            format_clock(resolved.bed_time, tz)
        )
        .unwrap();
    }

    output
}
