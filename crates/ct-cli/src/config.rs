//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use ct_core::{CoffeeCatalog, DaySchedule, MilkTable, ModelConfig};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Daily wake-up and bed times (`wake_up`, `bed_time` as "HH:MM").
    #[serde(flatten)]
    pub schedule: DaySchedule,

    /// Model constants (`[model]` table).
    #[serde(default)]
    pub model: ModelConfig,

    /// Milk options (`[[milk.modifiers]]`); replaces the built-in table.
    #[serde(default)]
    pub milk: MilkTable,

    /// Drink presets (`[[catalog.drinks]]`); replaces the built-in catalog.
    #[serde(default)]
    pub catalog: CoffeeCatalog,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("wake_up", &self.schedule.wake_up)
            .field("bed_time", &self.schedule.bed_time)
            .field("model", &self.model)
            .field("milk_options", &self.milk.iter().count())
            .field("catalog_drinks", &self.catalog.iter().count())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ct.db"),
            schedule: DaySchedule::default(),
            model: ModelConfig::default(),
            milk: MilkTable::standard(),
            catalog: CoffeeCatalog::standard(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CT_*, nested keys with `__`)
        figment = figment.merge(Env::prefixed("CT_").split("__"));

        let config: Self = figment.extract()?;
        config
            .model
            .validate()
            .map_err(|err| figment::Error::from(err.to_string()))?;
        Ok(config)
    }
}

/// Returns the platform-specific config directory for ct.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ct"))
}

/// Returns the platform-specific data directory for ct.
///
/// On Linux: `~/.local/share/ct`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ct"))
}
