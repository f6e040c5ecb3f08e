//! Core domain logic for the caffeine tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: logged drinks with milk-adjusted caffeine
//! - Model: active caffeine from a single entry at any instant
//! - Daily totals: consumed vs. active caffeine per calendar day
//! - Science windows: cortisol and sleep-impact advisories
//!
//! Every computation is a pure function of the entries and times passed in.

pub mod catalog;
pub mod daily;
pub mod entry;
pub mod milk;
pub mod model;
pub mod science;
pub mod series;
pub mod types;

pub use catalog::{CatalogDrink, CoffeeCatalog};
pub use daily::{
    DailySummary, TodayView, daily_active_mg, daily_consumed_mg, entries_for_day, newest_first,
    today_view, total_active_mg, total_consumed_mg,
};
pub use entry::{CoffeeEntry, NewEntry};
pub use milk::{MilkModifier, MilkTable, NO_MILK};
pub use model::{
    LevelBreakdown, ModelConfig, Phase, absorption_hours, breakdown, current_level,
    elimination_horizon, half_life_time, peak_time, phase_at,
};
pub use science::{
    DaySchedule, ResolvedSchedule, TimeWindow, cortisol_window, entry_conflicts_with_sleep,
    is_in_cortisol_window, is_in_sleep_window, sleep_window,
};
pub use series::{LevelSample, level_series, peak_sample};
pub use types::{DateKey, EntryId, ValidationError};
