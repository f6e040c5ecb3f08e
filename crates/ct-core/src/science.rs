//! Cortisol and sleep-impact windows.
//!
//! Both windows are advisory: they flag timing, they never block logging.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::CoffeeEntry;
use crate::model::{ModelConfig, elimination_horizon, hours};

/// A closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// True if `[start, end]` and `[other_start, other_end]` share any instant.
    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        other_start <= self.end && other_end >= self.start
    }
}

/// The period after waking when cortisol is naturally high.
pub fn cortisol_window(wake_up: DateTime<Utc>, config: &ModelConfig) -> TimeWindow {
    TimeWindow {
        start: wake_up,
        end: wake_up + Duration::minutes(i64::from(config.cortisol_window_minutes)),
    }
}

/// The period before bed when caffeine is likely to disturb sleep.
pub fn sleep_window(bed_time: DateTime<Utc>, config: &ModelConfig) -> TimeWindow {
    TimeWindow {
        start: bed_time - hours(config.sleep_window_hours),
        end: bed_time,
    }
}

pub fn is_in_cortisol_window(
    wake_up: DateTime<Utc>,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> bool {
    cortisol_window(wake_up, config).contains(at)
}

pub fn is_in_sleep_window(bed_time: DateTime<Utc>, at: DateTime<Utc>, config: &ModelConfig) -> bool {
    sleep_window(bed_time, config).contains(at)
}

/// True if the entry's arc, from consumption to its elimination horizon,
/// reaches into the sleep-impact window.
pub fn entry_conflicts_with_sleep(
    entry: &CoffeeEntry,
    bed_time: DateTime<Utc>,
    config: &ModelConfig,
) -> bool {
    sleep_window(bed_time, config).overlaps(entry.consumed_at, elimination_horizon(entry, config))
}

/// Daily wake-up and bed times in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(with = "hh_mm")]
    pub wake_up: NaiveTime,
    #[serde(with = "hh_mm")]
    pub bed_time: NaiveTime,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            wake_up: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            bed_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default(),
        }
    }
}

/// A [`DaySchedule`] pinned to concrete instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule {
    pub wake_up: DateTime<Utc>,
    pub bed_time: DateTime<Utc>,
}

impl DaySchedule {
    /// Resolves the schedule for the local day `date` in `tz`.
    ///
    /// A bed time at or before the wake-up time falls on the next calendar day.
    pub fn resolve<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> ResolvedSchedule {
        let wake_up = local_to_utc(date, self.wake_up, tz);
        let bed_date = if self.bed_time <= self.wake_up {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };
        ResolvedSchedule {
            wake_up,
            bed_time: local_to_utc(bed_date, self.bed_time, tz),
        }
    }
}

/// Converts a local wall-clock time to UTC.
/// Ambiguous times (DST fall-back) use the earlier instant; nonexistent
/// times (DST spring-forward) move forward an hour.
fn local_to_utc<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let local = date.and_time(time);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| shifted.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::entry::NewEntry;
    use crate::milk::MilkTable;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    fn espresso_at(at: DateTime<Utc>) -> CoffeeEntry {
        let new = NewEntry {
            drink_type: "Espresso".to_string(),
            volume_ml: 30.0,
            base_caffeine_mg: 75.0,
            milk: None,
            consumed_at: at,
        };
        CoffeeEntry::new(new, &MilkTable::standard(), &Utc).unwrap()
    }

    #[test]
    fn test_cortisol_window_scenario() {
        let config = ModelConfig::default();
        let wake = ts(7, 0);
        assert!(is_in_cortisol_window(wake, ts(7, 30), &config));
        assert!(is_in_cortisol_window(wake, ts(8, 30), &config));
        assert!(!is_in_cortisol_window(wake, ts(8, 31), &config));
        assert!(!is_in_cortisol_window(wake, ts(6, 59), &config));
    }

    #[test]
    fn test_sleep_window_scenario() {
        let config = ModelConfig::default();
        let bed = ts(22, 0);
        assert!(is_in_sleep_window(bed, ts(17, 0), &config));
        assert!(is_in_sleep_window(bed, ts(16, 0), &config));
        assert!(!is_in_sleep_window(bed, ts(15, 59), &config));
        assert!(!is_in_sleep_window(bed, ts(22, 1), &config));
    }

    #[test]
    fn test_oversized_sleep_window_does_not_overflow() {
        let config = ModelConfig {
            sleep_window_hours: 1e12,
            ..ModelConfig::default()
        };
        let window = sleep_window(ts(22, 0), &config);
        assert_eq!(window.start, ts(22, 0) - Duration::hours(24 * 7));
        assert!(entry_conflicts_with_sleep(&espresso_at(ts(9, 0)), ts(22, 0), &config));
    }

    #[test]
    fn test_morning_coffee_clears_before_sleep_window() {
        let config = ModelConfig::default();
        // Horizon 12:00 ends before the window opens at 16:00.
        assert!(!entry_conflicts_with_sleep(&espresso_at(ts(0, 0)), ts(22, 0), &config));
    }

    #[test]
    fn test_afternoon_coffee_conflicts_with_sleep() {
        let config = ModelConfig::default();
        // Horizon 16:00 touches the window start.
        assert!(entry_conflicts_with_sleep(&espresso_at(ts(4, 0)), ts(22, 0), &config));
        assert!(entry_conflicts_with_sleep(&espresso_at(ts(14, 0)), ts(22, 0), &config));
        assert!(entry_conflicts_with_sleep(&espresso_at(ts(22, 0)), ts(22, 0), &config));
    }

    #[test]
    fn test_coffee_after_bed_time_does_not_conflict() {
        let config = ModelConfig::default();
        assert!(!entry_conflicts_with_sleep(&espresso_at(ts(22, 30)), ts(22, 0), &config));
    }

    #[test]
    fn test_window_lengths_follow_config() {
        let config = ModelConfig {
            cortisol_window_minutes: 60,
            sleep_window_hours: 8.0,
            ..ModelConfig::default()
        };
        assert_eq!(cortisol_window(ts(7, 0), &config).end, ts(8, 0));
        assert_eq!(sleep_window(ts(22, 0), &config).start, ts(14, 0));
    }

    #[test]
    fn test_schedule_resolves_in_local_time() {
        let schedule = DaySchedule::default();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let resolved = schedule.resolve(date, &minus_five);
        assert_eq!(resolved.wake_up, ts(12, 0));
        assert_eq!(
            resolved.bed_time,
            Utc.with_ymd_and_hms(2025, 3, 2, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_bed_after_midnight_is_next_day() {
        let schedule = DaySchedule {
            wake_up: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            bed_time: NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let resolved = schedule.resolve(date, &Utc);
        assert_eq!(resolved.wake_up, ts(9, 0));
        assert_eq!(
            resolved.bed_time,
            Utc.with_ymd_and_hms(2025, 3, 2, 1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_schedule_serde_uses_clock_strings() {
        let schedule: DaySchedule =
            serde_json::from_str(r#"{"wake_up":"06:30","bed_time":"22:15"}"#).unwrap();
        assert_eq!(schedule.wake_up, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"{"wake_up":"06:30","bed_time":"22:15"}"#);

        assert!(serde_json::from_str::<DaySchedule>(r#"{"wake_up":"7am","bed_time":"22:00"}"#).is_err());
    }
}
