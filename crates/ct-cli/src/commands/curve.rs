//! Curve command: active caffeine sampled across a local day.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{Duration, Local, TimeZone, Utc};
use ct_core::{
    CoffeeEntry, DateKey, LevelSample, MilkTable, ModelConfig, level_series, peak_sample,
};
use ct_db::Database;
use serde::Serialize;

use super::util::{day_bounds, format_clock, format_mg, parse_date_key};
use crate::Config;

/// Width of the bar for the highest sample.
const BAR_WIDTH: f64 = 40.0;

/// A day's sampled curve.
#[derive(Debug, Serialize)]
pub struct Curve {
    pub date_key: DateKey,
    pub step_minutes: u32,
    pub peak: Option<LevelSample>,
    pub samples: Vec<LevelSample>,
}

/// Runs the curve command.
pub fn run(
    db: &Database,
    config: &Config,
    date: Option<&str>,
    step_minutes: u32,
    json: bool,
) -> Result<()> {
    let today = DateKey::for_instant(Utc::now(), &Local);
    let day = parse_date_key(date, today)?;
    // Drinks from the previous day can still be active after midnight.
    let entries = db.load_entries().context("failed to load entries")?;

    let curve = build_curve(
        &entries,
        &config.milk,
        &config.model,
        day,
        step_minutes,
        &Local,
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&curve)?);
    } else {
        print!("{}", format_curve(&curve, &Local));
    }
    Ok(())
}

/// Samples the total level from local midnight to the next midnight.
pub fn build_curve<Tz: TimeZone>(
    entries: &[CoffeeEntry],
    milk: &MilkTable,
    model: &ModelConfig,
    day: DateKey,
    step_minutes: u32,
    tz: &Tz,
) -> Curve {
    let (start, end) = day_bounds(day, tz);
    let samples = level_series(
        entries,
        milk,
        model,
        start,
        end,
        Duration::minutes(i64::from(step_minutes)),
    );
    Curve {
        date_key: day,
        step_minutes,
        peak: peak_sample(&samples),
        samples,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar(level: f64, peak: f64) -> String {
    if peak <= 0.0 {
        return String::new();
    }
    let len = (level / peak * BAR_WIDTH).round().clamp(0.0, BAR_WIDTH) as usize;
    "█".repeat(len)
}

/// Formats the curve as a text bar chart.
pub fn format_curve<Tz: TimeZone>(curve: &Curve, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut output = String::new();

    writeln!(
        output,
        "CAFFEINE CURVE: {} (every {} min)",
        curve.date_key.date().format("%A, %b %-d, %Y"),
        curve.step_minutes
    )
    .unwrap();
    writeln!(output).unwrap();

    let Some(peak) = curve.peak.filter(|p| p.level_mg > 0.0) else {
        writeln!(output, "No active caffeine on this day.").unwrap();
        return output;
    };

    for sample in &curve.samples {
        writeln!(
            output,
            "{}  {:>9}  {}",
            format_clock(sample.at, tz),
            format_mg(sample.level_mg),
            bar(sample.level_mg, peak.level_mg)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(
        output,
        "Peak: {} at {}",
        format_mg(peak.level_mg),
        format_clock(peak.at, tz)
    )
    .unwrap();

    output
}
