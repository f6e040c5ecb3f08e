//! Per-day grouping and totals.
//!
//! Two totals answer different questions and are kept apart:
//! - consumed: how much caffeine was drunk (sum of base caffeine)
//! - active: how much is in the body right now (sum of model levels)

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::entry::CoffeeEntry;
use crate::milk::MilkTable;
use crate::model::{ModelConfig, current_level};
use crate::types::DateKey;

/// Entries logged on `date_key`, in input order.
pub fn entries_for_day<'a>(entries: &'a [CoffeeEntry], date_key: &DateKey) -> Vec<&'a CoffeeEntry> {
    entries.iter().filter(|e| e.date_key == *date_key).collect()
}

/// Sorts entries newest first (display order), breaking ties by ID.
pub fn newest_first(entries: &mut [&CoffeeEntry]) {
    entries.sort_by(|a, b| {
        b.consumed_at
            .cmp(&a.consumed_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Sum of active caffeine at `at`. Entries are assumed not to interact.
pub fn total_active_mg<'a>(
    entries: impl IntoIterator<Item = &'a CoffeeEntry>,
    milk: &MilkTable,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> f64 {
    entries
        .into_iter()
        .map(|entry| current_level(entry, milk, at, config))
        .sum()
}

/// Sum of base caffeine. Corrupted values are skipped.
pub fn total_consumed_mg<'a>(entries: impl IntoIterator<Item = &'a CoffeeEntry>) -> f64 {
    entries
        .into_iter()
        .filter(|entry| {
            let ok = entry.base_caffeine_mg.is_finite() && entry.base_caffeine_mg >= 0.0;
            if !ok {
                tracing::warn!(entry = %entry.id, "skipping invalid caffeine amount");
            }
            ok
        })
        .map(|entry| entry.base_caffeine_mg)
        .sum()
}

/// Active caffeine at `at` from entries logged on `date_key`.
pub fn daily_active_mg(
    entries: &[CoffeeEntry],
    milk: &MilkTable,
    date_key: &DateKey,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> f64 {
    total_active_mg(entries_for_day(entries, date_key), milk, at, config)
}

/// Caffeine consumed on `date_key`.
pub fn daily_consumed_mg(entries: &[CoffeeEntry], date_key: &DateKey) -> f64 {
    total_consumed_mg(entries_for_day(entries, date_key))
}

/// Both daily totals at an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date_key: DateKey,
    pub entry_count: usize,
    pub consumed_mg: f64,
    pub active_mg: f64,
}

impl DailySummary {
    pub fn compute(
        entries: &[CoffeeEntry],
        milk: &MilkTable,
        date_key: DateKey,
        at: DateTime<Utc>,
        config: &ModelConfig,
    ) -> Self {
        let day = entries_for_day(entries, &date_key);
        Self {
            date_key,
            entry_count: day.len(),
            consumed_mg: total_consumed_mg(day.iter().copied()),
            active_mg: total_active_mg(day.iter().copied(), milk, at, config),
        }
    }
}

/// The "today" view after checking for a day change.
#[derive(Debug, Clone, PartialEq)]
pub struct TodayView<'a> {
    /// Today's key in the viewer's time zone.
    pub date_key: DateKey,
    /// True if `date_key` differs from the previously observed key.
    pub rolled_over: bool,
    /// Today's entries, newest first.
    pub entries: Vec<&'a CoffeeEntry>,
}

/// Builds today's view.
///
/// A rollover only changes which entries are shown; earlier days stay in
/// `entries` and remain reachable through [`entries_for_day`].
pub fn today_view<'a, Tz: TimeZone>(
    entries: &'a [CoffeeEntry],
    previous_key: Option<DateKey>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> TodayView<'a> {
    let date_key = DateKey::for_instant(now, tz);
    let rolled_over = previous_key.is_some_and(|previous| previous != date_key);
    if rolled_over {
        tracing::debug!(%date_key, "day rolled over");
    }

    let mut today = entries_for_day(entries, &date_key);
    newest_first(&mut today);

    TodayView {
        date_key,
        rolled_over,
        entries: today,
    }
}
