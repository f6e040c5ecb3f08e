//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use ct_core::DateKey;
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("valid regex")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_datetime_at(s, Utc::now())
}

/// Like [`parse_datetime`], resolving relative times against `now`.
pub fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    // Try ISO 8601 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    // Safe to create Duration now that we've validated the range
    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(now - duration)
}

/// Parse a day as `YYYY-MM-DD`, "today" or "yesterday" (local to `today`).
pub fn parse_date_key(s: Option<&str>, today: DateKey) -> anyhow::Result<DateKey> {
    match s.map(str::trim) {
        None | Some("today") => Ok(today),
        Some("yesterday") => today
            .date()
            .pred_opt()
            .map(DateKey::from_date)
            .context("date out of range"),
        Some(other) => other
            .parse()
            .with_context(|| format!("invalid --date {other}, expected YYYY-MM-DD")),
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc<Tz: TimeZone>(local_date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| one_am.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Half-open UTC bounds of a local calendar day.
pub fn day_bounds<Tz: TimeZone>(day: DateKey, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = day.date();
    let next = date.succ_opt().unwrap_or(date);
    (local_midnight_to_utc(date, tz), local_midnight_to_utc(next, tz))
}

/// Formats milligrams with one decimal.
pub fn format_mg(mg: f64) -> String {
    format!("{mg:.1} mg")
}

/// Formats an instant as local "HH:MM".
pub fn format_clock<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_datetime_at("2025-03-01T09:00:00+01:00", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn parses_relative_times() {
        assert_eq!(
            parse_datetime_at("2 hours ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_datetime_at("1 minute ago", now()).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 11, 59, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_and_huge_values() {
        assert!(parse_datetime_at("yesterday-ish", now()).is_err());
        assert!(parse_datetime_at("99999999999 weeks ago", now()).is_err());
    }

    #[test]
    fn parses_date_keys() {
        let today: DateKey = "2025-03-01".parse().unwrap();
        assert_eq!(parse_date_key(None, today).unwrap(), today);
        assert_eq!(
            parse_date_key(Some("yesterday"), today).unwrap().to_string(),
            "2025-02-28"
        );
        assert_eq!(
            parse_date_key(Some("2024-12-25"), today).unwrap().to_string(),
            "2024-12-25"
        );
        assert!(parse_date_key(Some("Dec 25"), today).is_err());
    }

    #[test]
    fn day_bounds_follow_time_zone() {
        let day: DateKey = "2025-03-01".parse().unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let (start, end) = day_bounds(day, &plus_two);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 28, 22, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn formats_values() {
        assert_eq!(format_mg(114.4), "114.4 mg");
        assert_eq!(format_mg(0.0), "0.0 mg");
        assert_eq!(format_clock(now(), &Utc), "12:00");
    }
}
