//! Sampled level curves for charts.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::daily::total_active_mg;
use crate::entry::CoffeeEntry;
use crate::milk::MilkTable;
use crate::model::ModelConfig;

/// Total active caffeine at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSample {
    pub at: DateTime<Utc>,
    pub level_mg: f64,
}

/// Samples the summed level at `start`, `start + step`, ... up to `end` inclusive.
///
/// Returns an empty series if `step` is not positive or `end` precedes `start`.
pub fn level_series(
    entries: &[CoffeeEntry],
    milk: &MilkTable,
    config: &ModelConfig,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> Vec<LevelSample> {
    if step <= Duration::zero() || end < start {
        return Vec::new();
    }

    let mut samples = Vec::new();
    let mut at = start;
    while at <= end {
        samples.push(LevelSample {
            at,
            level_mg: total_active_mg(entries, milk, at, config),
        });
        at += step;
    }
    samples
}

/// The highest sample, if any.
pub fn peak_sample(samples: &[LevelSample]) -> Option<LevelSample> {
    samples
        .iter()
        .copied()
        .max_by(|a, b| a.level_mg.total_cmp(&b.level_mg))
}
