//! Milk modifiers: how adding milk changes caffeine content and absorption.

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Name of the zero-effect modifier every table carries.
pub const NO_MILK: &str = "No Milk";

/// Effect of a milk type on a drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilkModifier {
    /// Display name, also the lookup key.
    pub name: String,

    /// Extra minutes before absorption begins.
    ///
    /// Informational only; the decay model uses `peak_delay_minutes`.
    #[serde(default)]
    pub absorption_delay_minutes: u32,

    /// Fraction of base caffeine removed, in \[0.0, 1.0).
    #[serde(default)]
    pub caffeine_reduction: f64,

    /// Minutes added to the base absorption window.
    #[serde(default)]
    pub peak_delay_minutes: u32,
}

impl MilkModifier {
    /// Creates a modifier after validating the reduction fraction.
    pub fn new(
        name: impl Into<String>,
        absorption_delay_minutes: u32,
        caffeine_reduction: f64,
        peak_delay_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let modifier = Self {
            name: name.into(),
            absorption_delay_minutes,
            caffeine_reduction,
            peak_delay_minutes,
        };
        modifier.validate()?;
        Ok(modifier)
    }

    /// The zero-effect "No Milk" modifier.
    #[must_use]
    pub fn none() -> Self {
        Self {
            name: NO_MILK.to_string(),
            absorption_delay_minutes: 0,
            caffeine_reduction: 0.0,
            peak_delay_minutes: 0,
        }
    }

    /// Returns true if this modifier changes nothing.
    #[must_use]
    pub fn is_zero_effect(&self) -> bool {
        self.absorption_delay_minutes == 0
            && self.caffeine_reduction <= 0.0
            && self.peak_delay_minutes == 0
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "milk modifier name",
            });
        }
        if !self.caffeine_reduction.is_finite() || !(0.0..1.0).contains(&self.caffeine_reduction)
        {
            return Err(ValidationError::InvalidMilkModifier {
                name: self.name.clone(),
                reason: "caffeine reduction must be in [0, 1)",
            });
        }
        Ok(())
    }
}

/// Immutable name-keyed table of milk modifiers.
///
/// Always contains exactly one zero-effect [`NO_MILK`] entry, kept first,
/// which is the fallback for unknown names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilkTable {
    modifiers: Vec<MilkModifier>,
}

impl MilkTable {
    /// Builds a table, inserting "No Milk" if the caller did not supply it.
    pub fn new(modifiers: Vec<MilkModifier>) -> Result<Self, ValidationError> {
        let mut table: Vec<MilkModifier> = Vec::with_capacity(modifiers.len() + 1);
        for modifier in modifiers {
            modifier.validate()?;
            if table
                .iter()
                .any(|m| m.name.eq_ignore_ascii_case(&modifier.name))
            {
                return Err(ValidationError::DuplicateMilkModifier {
                    name: modifier.name,
                });
            }
            if modifier.name.eq_ignore_ascii_case(NO_MILK) && !modifier.is_zero_effect() {
                return Err(ValidationError::InvalidMilkModifier {
                    name: modifier.name,
                    reason: "\"No Milk\" must have no effect",
                });
            }
            table.push(modifier);
        }

        match table.iter().position(|m| m.name.eq_ignore_ascii_case(NO_MILK)) {
            Some(0) => {}
            Some(index) => {
                let no_milk = table.remove(index);
                table.insert(0, no_milk);
            }
            None => table.insert(0, MilkModifier::none()),
        }

        Ok(Self { modifiers: table })
    }

    /// The built-in milk table.
    #[must_use]
    pub fn standard() -> Self {
        let row = |name: &str, absorption, reduction, peak| MilkModifier {
            name: name.to_string(),
            absorption_delay_minutes: absorption,
            caffeine_reduction: reduction,
            peak_delay_minutes: peak,
        };
        Self {
            modifiers: vec![
                MilkModifier::none(),
                row("Whole Milk", 15, 0.12, 20),
                row("Skim Milk", 10, 0.08, 15),
                row("Oat Milk", 12, 0.10, 18),
                row("Almond Milk", 8, 0.06, 12),
                row("Soy Milk", 10, 0.09, 15),
                row("Heavy Cream", 20, 0.15, 25),
            ],
        }
    }

    /// Finds a modifier by name.
    ///
    /// Exact matches win over case-insensitive ones. Unknown names resolve to
    /// "No Milk" so a renamed or corrupted reference never breaks level math.
    pub fn lookup(&self, name: &str) -> &MilkModifier {
        if let Some(found) = self.get(name) {
            return found;
        }
        tracing::debug!(milk = name, "unknown milk modifier, using {NO_MILK}");
        self.no_milk()
    }

    /// Finds a modifier by name without falling back.
    pub fn get(&self, name: &str) -> Option<&MilkModifier> {
        self.modifiers
            .iter()
            .find(|m| m.name == name)
            .or_else(|| {
                self.modifiers
                    .iter()
                    .find(|m| m.name.eq_ignore_ascii_case(name))
            })
    }

    /// The zero-effect default.
    pub fn no_milk(&self) -> &MilkModifier {
        &self.modifiers[0]
    }

    /// Iterates modifiers in table order.
    pub fn iter(&self) -> impl Iterator<Item = &MilkModifier> {
        self.modifiers.iter()
    }
}

impl Default for MilkTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'de> Deserialize<'de> for MilkTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            modifiers: Vec<MilkModifier>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.modifiers).map_err(serde::de::Error::custom)
    }
}
