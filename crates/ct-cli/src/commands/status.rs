//! Status command: today's active vs. consumed caffeine and science windows.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use ct_core::{
    CoffeeEntry, DateKey, EntryId, MilkTable, Phase, TimeWindow, cortisol_window, current_level,
    entry_conflicts_with_sleep, peak_time, phase_at, sleep_window, today_view, total_active_mg,
    total_consumed_mg,
};
use ct_db::Database;
use serde::Serialize;

use super::util::{format_clock, format_mg, parse_datetime};
use crate::Config;

/// Computed status at an instant.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub at: DateTime<Utc>,
    pub timezone: String,
    pub date_key: DateKey,
    pub active_mg: f64,
    pub consumed_mg: f64,
    pub in_cortisol_window: bool,
    pub in_sleep_window: bool,
    pub cortisol_window: TimeWindow,
    pub sleep_window: TimeWindow,
    pub drinks: Vec<StatusDrink>,
}

/// One of today's drinks at the status instant.
#[derive(Debug, Serialize)]
pub struct StatusDrink {
    pub id: EntryId,
    pub drink_type: String,
    pub milk: String,
    pub consumed_at: DateTime<Utc>,
    pub effective_caffeine_mg: f64,
    pub level_mg: f64,
    pub phase: Phase,
    pub peak_at: DateTime<Utc>,
    pub conflicts_with_sleep: bool,
}

/// Runs the status command.
pub fn run(db: &Database, config: &Config, at: Option<&str>, json: bool) -> Result<()> {
    let at = match at {
        Some(at) => parse_datetime(at)?,
        None => Utc::now(),
    };
    let entries = db.load_entries()?;
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let report = build_report(&entries, &config.milk, config, at, &Local, timezone);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, &Local));
    }
    Ok(())
}

/// Builds the status report for the local day containing `at`.
pub fn build_report<Tz: TimeZone>(
    entries: &[CoffeeEntry],
    milk: &MilkTable,
    config: &Config,
    at: DateTime<Utc>,
    tz: &Tz,
    timezone: String,
) -> StatusReport {
    let model = &config.model;
    let today = today_view(entries, None, at, tz);
    let schedule = config.schedule.resolve(today.date_key.date(), tz);

    let drinks = today
        .entries
        .iter()
        .map(|entry| StatusDrink {
            id: entry.id.clone(),
            drink_type: entry.drink_type.clone(),
            milk: entry.milk.clone(),
            consumed_at: entry.consumed_at,
            effective_caffeine_mg: entry.effective_caffeine_mg,
            level_mg: current_level(entry, milk, at, model),
            phase: phase_at(entry, milk, at, model),
            peak_at: peak_time(entry, milk, model),
            conflicts_with_sleep: entry_conflicts_with_sleep(entry, schedule.bed_time, model),
        })
        .collect();

    let cortisol = cortisol_window(schedule.wake_up, model);
    let sleep = sleep_window(schedule.bed_time, model);

    StatusReport {
        at,
        timezone,
        date_key: today.date_key,
        active_mg: total_active_mg(today.entries.iter().copied(), milk, at, model),
        consumed_mg: total_consumed_mg(today.entries.iter().copied()),
        in_cortisol_window: cortisol.contains(at),
        in_sleep_window: sleep.contains(at),
        cortisol_window: cortisol,
        sleep_window: sleep,
        drinks,
    }
}

pub(crate) const fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::NotStarted => "upcoming",
        Phase::Absorbing => "absorbing",
        Phase::Decaying => "decaying",
        Phase::Eliminated => "cleared",
    }
}

fn format_window<Tz: TimeZone>(window: &TimeWindow, active: bool, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let marker = if active { "  (now)" } else { "" };
    format!(
        "{}-{}{marker}",
        format_clock(window.start, tz),
        format_clock(window.end, tz)
    )
}

/// Formats the human-readable status output.
pub fn format_report<Tz: TimeZone>(report: &StatusReport, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();
    let local = report.at.with_timezone(tz);

    writeln!(
        output,
        "CAFFEINE STATUS: {}",
        local.format("%A, %b %-d, %Y %H:%M")
    )
    .unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Active now:     {}", format_mg(report.active_mg)).unwrap();
    let noun = if report.drinks.len() == 1 {
        "drink"
    } else {
        "drinks"
    };
    writeln!(
        output,
        "Consumed today: {} ({} {noun})",
        format_mg(report.consumed_mg),
        report.drinks.len()
    )
    .unwrap();

    writeln!(output).unwrap();
    writeln!(output, "DRINKS").unwrap();
    writeln!(output, "──────").unwrap();
    if report.drinks.is_empty() {
        writeln!(output, "No drinks logged today.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'ct log <drink>' to log one.").unwrap();
    } else {
        let mut any_conflict = false;
        for drink in &report.drinks {
            let flag = if drink.conflicts_with_sleep {
                any_conflict = true;
                "  *"
            } else {
                ""
            };
            writeln!(
                output,
                "{}  {:<18}  {:<12}  {:>9}  {}{flag}",
                format_clock(drink.consumed_at, tz),
                drink.drink_type,
                drink.milk,
                format_mg(drink.level_mg),
                phase_label(drink.phase),
            )
            .unwrap();
        }
        if any_conflict {
            writeln!(output).unwrap();
            writeln!(output, "* still active during the sleep window").unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "WINDOWS").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(
        output,
        "Cortisol: {}",
        format_window(&report.cortisol_window, report.in_cortisol_window, tz)
    )
    .unwrap();
    writeln!(
        output,
        "Sleep:    {}",
        format_window(&report.sleep_window, report.in_sleep_window, tz)
    )
    .unwrap();

    output
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ct_core::{CoffeeCatalog, DaySchedule, ModelConfig, NewEntry};
    use insta::assert_snapshot;

    use super::*;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    fn config() -> Config {
        Config {
            database_path: PathBuf::from("ct.db"),
            schedule: DaySchedule::default(),
            model: ModelConfig::default(),
            milk: MilkTable::standard(),
            catalog: CoffeeCatalog::standard(),
        }
    }

    fn log(drink: &str, caffeine: f64, milk: Option<&str>, at: DateTime<Utc>) -> CoffeeEntry {
        let new = NewEntry {
            drink_type: drink.to_string(),
            volume_ml: 200.0,
            base_caffeine_mg: caffeine,
            milk: milk.map(String::from),
            consumed_at: at,
        };
        CoffeeEntry::new(new, &MilkTable::standard(), &Utc).unwrap()
    }

    fn report(entries: &[CoffeeEntry], at: DateTime<Utc>) -> StatusReport {
        build_report(
            entries,
            &MilkTable::standard(),
            &config(),
            at,
            &Utc,
            "UTC".to_string(),
        )
    }

    #[test]
    fn totals_separate_active_from_consumed() {
        let entries = vec![
            log("Flat White", 130.0, Some("Whole Milk"), ts(7, 0)),
            log("Espresso", 75.0, None, ts(9, 0)),
        ];
        let report = report(&entries, ts(10, 0));

        assert!((report.consumed_mg - 205.0).abs() < 1e-9);
        assert!((report.active_mg - 162.524_570_116).abs() < 1e-6);
        assert_eq!(report.drinks[0].drink_type, "Espresso", "newest first");
        assert!(!report.in_cortisol_window);
        assert!(!report.in_sleep_window);
    }

    #[test]
    fn status_output_snapshot() {
        let entries = vec![
            log("Flat White", 130.0, Some("Whole Milk"), ts(7, 0)),
            log("Espresso", 75.0, None, ts(9, 0)),
            log("Cold Brew", 200.0, None, ts(11, 0)),
        ];
        let output = format_report(&report(&entries, ts(10, 0)), &Utc);
        assert_snapshot!(output, @r"
        CAFFEINE STATUS: Saturday, Mar 1, 2025 10:00

        Active now:     162.5 mg
        Consumed today: 405.0 mg (3 drinks)

        DRINKS
        ──────
        11:00  Cold Brew           No Milk          0.0 mg  upcoming  *
        09:00  Espresso            No Milk         72.7 mg  decaying  *
        07:00  Flat White          Whole Milk      89.9 mg  decaying  *

        * still active during the sleep window

        WINDOWS
        ───────
        Cortisol: 07:00-08:30
        Sleep:    17:00-23:00
        ");
    }

    #[test]
    fn empty_day_snapshot() {
        let output = format_report(&report(&[], ts(7, 15)), &Utc);
        assert_snapshot!(output, @r"
        CAFFEINE STATUS: Saturday, Mar 1, 2025 07:15

        Active now:     0.0 mg
        Consumed today: 0.0 mg (0 drinks)

        DRINKS
        ──────
        No drinks logged today.

        Hint: Run 'ct log <drink>' to log one.

        WINDOWS
        ───────
        Cortisol: 07:00-08:30  (now)
        Sleep:    17:00-23:00
        ");
    }

    #[test]
    fn yesterday_is_not_in_today_status() {
        let entries = vec![log("Americano", 150.0, None, ts(22, 0))];
        let next_morning = ts(22, 0) + chrono::Duration::hours(10);
        let report = report(&entries, next_morning);

        assert!(report.drinks.is_empty());
        assert!(report.active_mg.abs() < f64::EPSILON);
    }

    #[test]
    fn json_output_uses_snake_case_phase() {
        let entries = vec![log("Espresso", 75.0, None, ts(9, 0))];
        let json = serde_json::to_value(report(&entries, ts(9, 30))).unwrap();
        assert_eq!(json["drinks"][0]["phase"], "absorbing");
        assert_eq!(json["date_key"], "2025-03-01");
        assert_eq!(json["timezone"], "UTC");
    }
}
