//! Caffeine absorption and decay model.
//!
//! # Model Summary
//!
//! 1. Absorption: the level rises linearly from 0 at consumption to the
//!    entry's effective caffeine at the peak, `base_absorption_minutes` plus
//!    the milk modifier's peak delay after consumption.
//! 2. Decay: after the peak the level halves every `half_life_hours`.
//! 3. Cutoff: nothing before consumption, and nothing once more than
//!    `cutoff_hours` have passed.
//!
//! Entries are independent; totals are plain sums (see [`crate::daily`]).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::CoffeeEntry;
use crate::milk::MilkTable;
use crate::types::ValidationError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Longest span any hour-valued setting may take (one week).
pub const MAX_SPAN_HOURS: f64 = 24.0 * 7.0;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Tunable constants of the model. Defaults are the reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Absorption window before any milk delay.
    /// Default: 45 minutes.
    pub base_absorption_minutes: u32,

    /// Elimination half-life after the peak.
    /// Default: 5.5 hours.
    pub half_life_hours: f64,

    /// Hard cutoff after which an entry contributes nothing.
    /// Default: 24 hours.
    pub cutoff_hours: f64,

    /// Where an entry's arc is drawn to end and the span used for
    /// sleep-conflict checks.
    /// Default: 12 hours.
    pub elimination_horizon_hours: f64,

    /// Length of the post-wake cortisol window.
    /// Default: 90 minutes.
    pub cortisol_window_minutes: u32,

    /// Length of the pre-bed sleep-impact window.
    /// Default: 6 hours.
    pub sleep_window_hours: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_absorption_minutes: 45,
            half_life_hours: 5.5,
            cutoff_hours: 24.0,
            elimination_horizon_hours: 12.0,
            cortisol_window_minutes: 90,
            sleep_window_hours: 6.0,
        }
    }
}

impl ModelConfig {
    /// Checks that every constant is usable by the model.
    ///
    /// Hour-valued settings must be finite and at most [`MAX_SPAN_HOURS`];
    /// the half-life and cutoff must be positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let spans = [
            ("half_life_hours", self.half_life_hours, false),
            ("cutoff_hours", self.cutoff_hours, false),
            ("elimination_horizon_hours", self.elimination_horizon_hours, false),
            ("sleep_window_hours", self.sleep_window_hours, true),
        ];
        for (field, value, zero_ok) in spans {
            if !value.is_finite() {
                return Err(ValidationError::InvalidModelConfig {
                    field,
                    reason: "must be a finite number",
                });
            }
            if value < 0.0 || (value <= 0.0 && !zero_ok) {
                return Err(ValidationError::InvalidModelConfig {
                    field,
                    reason: "must be positive",
                });
            }
            if value > MAX_SPAN_HOURS {
                return Err(ValidationError::InvalidModelConfig {
                    field,
                    reason: "must be at most one week",
                });
            }
        }

        if self.base_absorption_minutes == 0 || self.base_absorption_minutes > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidModelConfig {
                field: "base_absorption_minutes",
                reason: "must be between 1 and 1440",
            });
        }
        if self.cortisol_window_minutes > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidModelConfig {
                field: "cortisol_window_minutes",
                reason: "must be at most 1440",
            });
        }
        Ok(())
    }
}

/// Where an entry is on its curve at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The query time is before consumption.
    NotStarted,
    /// Rising linearly toward the peak.
    Absorbing,
    /// Falling exponentially after the peak.
    Decaying,
    /// Past the cutoff.
    Eliminated,
}

/// One entry's contribution at an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelBreakdown<'a> {
    pub entry: &'a CoffeeEntry,
    pub level_mg: f64,
    pub phase: Phase,
}

/// Converts fractional hours to a `Duration` at millisecond precision.
///
/// Saturates at [`MAX_SPAN_HOURS`] in either direction; NaN becomes zero.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn hours(value: f64) -> Duration {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(-MAX_SPAN_HOURS, MAX_SPAN_HOURS)
    };
    Duration::milliseconds((value * SECONDS_PER_HOUR * 1000.0).round() as i64)
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / (SECONDS_PER_HOUR * 1000.0)
}

/// Length of the absorption phase for an entry, in hours (always > 0).
pub fn absorption_hours(entry: &CoffeeEntry, milk: &MilkTable, config: &ModelConfig) -> f64 {
    let peak_delay = milk.lookup(&entry.milk).peak_delay_minutes;
    let minutes = f64::from(config.base_absorption_minutes.max(1)) + f64::from(peak_delay);
    minutes / 60.0
}

/// When the entry reaches its peak level.
pub fn peak_time(entry: &CoffeeEntry, milk: &MilkTable, config: &ModelConfig) -> DateTime<Utc> {
    let peak_delay = milk.lookup(&entry.milk).peak_delay_minutes;
    entry.consumed_at
        + Duration::minutes(i64::from(config.base_absorption_minutes.max(1)))
        + Duration::minutes(i64::from(peak_delay))
}

/// When the level has fallen to half the peak.
pub fn half_life_time(
    entry: &CoffeeEntry,
    milk: &MilkTable,
    config: &ModelConfig,
) -> DateTime<Utc> {
    peak_time(entry, milk, config) + hours(config.half_life_hours)
}

/// End of the entry's drawn arc, also used for sleep-conflict checks.
pub fn elimination_horizon(entry: &CoffeeEntry, config: &ModelConfig) -> DateTime<Utc> {
    entry.consumed_at + hours(config.elimination_horizon_hours)
}

/// Classifies `at` relative to the entry's curve.
pub fn phase_at(
    entry: &CoffeeEntry,
    milk: &MilkTable,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> Phase {
    let elapsed = elapsed_hours(entry.consumed_at, at);
    if elapsed < 0.0 {
        Phase::NotStarted
    } else if elapsed > config.cutoff_hours {
        Phase::Eliminated
    } else if elapsed <= absorption_hours(entry, milk, config) {
        Phase::Absorbing
    } else {
        Phase::Decaying
    }
}

/// Active caffeine (mg) from one entry at `at`.
///
/// Never negative and never NaN: corrupted entries contribute 0.
pub fn current_level(
    entry: &CoffeeEntry,
    milk: &MilkTable,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> f64 {
    if let Err(err) = entry.validate() {
        tracing::warn!(entry = %entry.id, %err, "skipping invalid entry");
        return 0.0;
    }

    let elapsed = elapsed_hours(entry.consumed_at, at);
    let absorption = absorption_hours(entry, milk, config);
    let peak = entry.effective_caffeine_mg;

    let level = match phase_at(entry, milk, at, config) {
        Phase::NotStarted | Phase::Eliminated => 0.0,
        Phase::Absorbing => peak * (elapsed / absorption),
        Phase::Decaying => {
            if config.half_life_hours > 0.0 {
                peak * 0.5_f64.powf((elapsed - absorption) / config.half_life_hours)
            } else {
                0.0
            }
        }
    };

    if level.is_finite() { level.max(0.0) } else { 0.0 }
}

/// Level and phase for every entry at `at`, in input order.
pub fn breakdown<'a>(
    entries: &'a [CoffeeEntry],
    milk: &MilkTable,
    at: DateTime<Utc>,
    config: &ModelConfig,
) -> Vec<LevelBreakdown<'a>> {
    entries
        .iter()
        .map(|entry| LevelBreakdown {
            entry,
            level_mg: current_level(entry, milk, at, config),
            phase: phase_at(entry, milk, at, config),
        })
        .collect()
}
