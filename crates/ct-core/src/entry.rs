//! Logged coffee entries.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogDrink;
use crate::milk::{MilkTable, NO_MILK};
use crate::types::{DateKey, EntryId, ValidationError};

/// A single logged drink.
///
/// Entries are immutable once created: the numbers captured at logging time
/// stay authoritative even if the catalog or milk table changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeEntry {
    /// Unique identifier, ordered by creation time.
    pub id: EntryId,

    /// Drink name as logged (e.g., "Flat White").
    pub drink_type: String,

    /// Volume in milliliters.
    pub volume_ml: f64,

    /// Caffeine before the milk modifier is applied.
    pub base_caffeine_mg: f64,

    /// Caffeine after the milk modifier is applied.
    pub effective_caffeine_mg: f64,

    /// When the drink was logged.
    pub consumed_at: DateTime<Utc>,

    /// Name of the milk modifier (may be "No Milk").
    #[serde(default = "default_milk")]
    pub milk: String,

    /// Local calendar day of `consumed_at`, fixed at creation.
    pub date_key: DateKey,
}

fn default_milk() -> String {
    NO_MILK.to_string()
}

/// Input for creating a [`CoffeeEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub drink_type: String,
    pub volume_ml: f64,
    pub base_caffeine_mg: f64,
    pub milk: Option<String>,
    pub consumed_at: DateTime<Utc>,
}

impl NewEntry {
    /// Pre-fills volume and caffeine from a catalog drink.
    pub fn from_catalog(
        drink: &CatalogDrink,
        milk: Option<String>,
        consumed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            drink_type: drink.name.clone(),
            volume_ml: drink.volume_ml,
            base_caffeine_mg: drink.caffeine_mg,
            milk,
            consumed_at,
        }
    }
}

impl CoffeeEntry {
    /// Creates an entry, applying the milk reduction and fixing the day key.
    ///
    /// `tz` is the user's time zone at logging time; it only affects `date_key`.
    pub fn new<Tz: TimeZone>(
        new: NewEntry,
        milk_table: &MilkTable,
        tz: &Tz,
    ) -> Result<Self, ValidationError> {
        let drink_type = new.drink_type.trim();
        if drink_type.is_empty() {
            return Err(ValidationError::Empty {
                field: "drink type",
            });
        }
        if !new.volume_ml.is_finite() || new.volume_ml <= 0.0 {
            return Err(ValidationError::InvalidEntry {
                field: "volume_ml",
                value: new.volume_ml,
            });
        }
        if !new.base_caffeine_mg.is_finite() || new.base_caffeine_mg < 0.0 {
            return Err(ValidationError::InvalidEntry {
                field: "base_caffeine_mg",
                value: new.base_caffeine_mg,
            });
        }

        let milk = match new.milk.as_deref() {
            None => milk_table.no_milk(),
            Some(name) => {
                milk_table
                    .get(name)
                    .ok_or_else(|| ValidationError::UnknownMilkModifier {
                        name: name.to_string(),
                    })?
            }
        };

        Ok(Self {
            id: EntryId::generate(Utc::now()),
            drink_type: drink_type.to_string(),
            volume_ml: new.volume_ml,
            base_caffeine_mg: new.base_caffeine_mg,
            effective_caffeine_mg: new.base_caffeine_mg * (1.0 - milk.caffeine_reduction),
            consumed_at: new.consumed_at,
            milk: milk.name.clone(),
            date_key: DateKey::for_instant(new.consumed_at, tz),
        })
    }

    /// Re-checks numeric fields of an entry that came from outside (e.g., storage).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("volume_ml", self.volume_ml, self.volume_ml > 0.0),
            ("base_caffeine_mg", self.base_caffeine_mg, self.base_caffeine_mg >= 0.0),
            (
                "effective_caffeine_mg",
                self.effective_caffeine_mg,
                self.effective_caffeine_mg >= 0.0
                    && self.effective_caffeine_mg <= self.base_caffeine_mg,
            ),
        ];
        for (field, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(ValidationError::InvalidEntry { field, value });
            }
        }
        Ok(())
    }

    /// Returns true if [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CoffeeCatalog;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    fn new_entry(base: f64, milk: Option<&str>) -> NewEntry {
        NewEntry {
            drink_type: "Americano".to_string(),
            volume_ml: 240.0,
            base_caffeine_mg: base,
            milk: milk.map(String::from),
            consumed_at: at(9, 0),
        }
    }

    #[test]
    fn milk_reduction_applies_to_effective_caffeine() {
        let entry =
            CoffeeEntry::new(new_entry(150.0, Some("Whole Milk")), &MilkTable::standard(), &Utc)
                .unwrap();
        assert!((entry.effective_caffeine_mg - 132.0).abs() < 1e-9);
        assert!((entry.base_caffeine_mg - 150.0).abs() < f64::EPSILON);
        assert_eq!(entry.milk, "Whole Milk");
    }

    #[test]
    fn flat_white_with_whole_milk() {
        let catalog = CoffeeCatalog::standard();
        let drink = catalog.lookup("Flat White").unwrap();
        let new = NewEntry::from_catalog(drink, Some("whole milk".to_string()), at(7, 0));
        let entry = CoffeeEntry::new(new, &MilkTable::standard(), &Utc).unwrap();

        assert!((entry.effective_caffeine_mg - 114.4).abs() < 1e-9);
        assert_eq!(entry.milk, "Whole Milk");
        assert_eq!(entry.drink_type, "Flat White");
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "no reduction means identical values")]
    fn no_milk_by_default() {
        let entry = CoffeeEntry::new(new_entry(75.0, None), &MilkTable::standard(), &Utc).unwrap();
        assert_eq!(entry.milk, NO_MILK);
        assert_eq!(entry.effective_caffeine_mg, 75.0);
    }

    #[test]
    fn unknown_milk_is_rejected_at_creation() {
        let result = CoffeeEntry::new(
            new_entry(75.0, Some("Camel Milk")),
            &MilkTable::standard(),
            &Utc,
        );
        assert!(matches!(
            result,
            Err(ValidationError::UnknownMilkModifier { .. })
        ));
    }

    #[test]
    fn rejects_bad_numbers() {
        let table = MilkTable::standard();
        let mut bad_volume = new_entry(75.0, None);
        bad_volume.volume_ml = 0.0;
        assert!(CoffeeEntry::new(bad_volume, &table, &Utc).is_err());

        assert!(CoffeeEntry::new(new_entry(-1.0, None), &table, &Utc).is_err());
        assert!(CoffeeEntry::new(new_entry(f64::NAN, None), &table, &Utc).is_err());

        let mut blank = new_entry(75.0, None);
        blank.drink_type = "  ".to_string();
        assert!(CoffeeEntry::new(blank, &table, &Utc).is_err());
    }

    #[test]
    fn backdated_entry_still_gets_a_later_id() {
        let table = MilkTable::standard();
        let mut current = new_entry(75.0, None);
        current.consumed_at = Utc::now();
        let mut backdated = new_entry(75.0, None);
        backdated.consumed_at = Utc::now() - chrono::Duration::hours(2);

        let first = CoffeeEntry::new(current, &table, &Utc).unwrap();
        let second = CoffeeEntry::new(backdated, &table, &Utc).unwrap();
        assert!(first.id < second.id, "{} should sort before {}", first.id, second.id);
    }

    #[test]
    fn date_key_is_fixed_at_creation() {
        let plus_ten = chrono::FixedOffset::east_opt(10 * 3600).unwrap();
        let mut new = new_entry(75.0, None);
        new.consumed_at = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();

        let entry = CoffeeEntry::new(new, &MilkTable::standard(), &plus_ten).unwrap();
        assert_eq!(entry.date_key.to_string(), "2025-03-02");
    }

    #[test]
    fn validate_catches_corrupted_entries() {
        let mut entry =
            CoffeeEntry::new(new_entry(75.0, None), &MilkTable::standard(), &Utc).unwrap();
        assert!(entry.is_valid());

        entry.effective_caffeine_mg = f64::NAN;
        assert!(matches!(
            entry.validate(),
            Err(ValidationError::InvalidEntry {
                field: "effective_caffeine_mg",
                ..
            })
        ));

        entry.effective_caffeine_mg = 100.0;
        assert!(!entry.is_valid(), "effective above base is corrupt");
    }

    #[test]
    fn serde_keeps_typed_timestamp() {
        let entry = CoffeeEntry::new(new_entry(75.0, None), &MilkTable::standard(), &Utc).unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"consumed_at\":\"2025-03-01T09:00:00Z\""));

        let parsed: CoffeeEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
        assert_eq!(parsed.consumed_at, at(9, 0));
    }

    #[test]
    fn missing_milk_deserializes_as_no_milk() {
        let json = r#"{
            "id": "0001740819600000-abcd1234",
            "drink_type": "Espresso",
            "volume_ml": 30.0,
            "base_caffeine_mg": 75.0,
            "effective_caffeine_mg": 75.0,
            "consumed_at": "2025-03-01T09:00:00Z",
            "date_key": "2025-03-01"
        }"#;
        let entry: CoffeeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.milk, NO_MILK);
    }
}
