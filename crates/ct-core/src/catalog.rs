//! Drink catalog used to pre-fill new entries.

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Default volume and caffeine for a named drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDrink {
    pub name: String,
    pub volume_ml: f64,
    pub caffeine_mg: f64,
}

/// Immutable drink name → defaults table.
///
/// Only consulted when an entry is created. Entries keep their own numbers,
/// so editing the catalog never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoffeeCatalog {
    drinks: Vec<CatalogDrink>,
}

impl CoffeeCatalog {
    /// Builds a catalog, rejecting blank or duplicate names and unusable numbers.
    pub fn new(drinks: Vec<CatalogDrink>) -> Result<Self, ValidationError> {
        for (idx, drink) in drinks.iter().enumerate() {
            let invalid = |reason| ValidationError::InvalidCatalogDrink {
                name: drink.name.clone(),
                reason,
            };
            if drink.name.trim().is_empty() {
                return Err(ValidationError::Empty {
                    field: "drink name",
                });
            }
            if !drink.volume_ml.is_finite() || drink.volume_ml <= 0.0 {
                return Err(invalid("volume must be positive"));
            }
            if !drink.caffeine_mg.is_finite() || drink.caffeine_mg < 0.0 {
                return Err(invalid("caffeine must not be negative"));
            }
            if drinks[..idx]
                .iter()
                .any(|d| d.name.trim().eq_ignore_ascii_case(drink.name.trim()))
            {
                return Err(invalid("duplicate drink name"));
            }
        }
        Ok(Self { drinks })
    }

    /// The built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        let drink = |name: &str, volume_ml, caffeine_mg| CatalogDrink {
            name: name.to_string(),
            volume_ml,
            caffeine_mg,
        };
        Self {
            drinks: vec![
                drink("Espresso", 30.0, 75.0),
                drink("Double Espresso", 60.0, 150.0),
                drink("Americano", 240.0, 150.0),
                drink("Flat White", 160.0, 130.0),
                drink("Latte", 240.0, 75.0),
                drink("Cappuccino", 180.0, 75.0),
                drink("Macchiato", 40.0, 75.0),
                drink("Mocha", 240.0, 95.0),
                drink("Cold Brew", 350.0, 200.0),
                drink("Drip Coffee", 240.0, 95.0),
            ],
        }
    }

    /// Case-insensitive lookup by drink name.
    pub fn lookup(&self, name: &str) -> Option<&CatalogDrink> {
        let name = name.trim();
        self.drinks
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogDrink> {
        self.drinks.iter()
    }
}

impl Default for CoffeeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'de> Deserialize<'de> for CoffeeCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            drinks: Vec<CatalogDrink>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.drinks).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::float_cmp, reason = "catalog constants are exact")]
    fn lookup_finds_standard_drinks() {
        let catalog = CoffeeCatalog::standard();
        let espresso = catalog.lookup("espresso").unwrap();
        assert_eq!(espresso.name, "Espresso");
        assert_eq!(espresso.caffeine_mg, 75.0);

        let flat_white = catalog.lookup(" Flat White ").unwrap();
        assert_eq!(flat_white.caffeine_mg, 130.0);
    }

    #[test]
    fn lookup_unknown_returns_none() {
        assert!(CoffeeCatalog::standard().lookup("Frappuccino").is_none());
    }

    #[test]
    fn custom_catalog_replaces_defaults() {
        let catalog = CoffeeCatalog::new(vec![CatalogDrink {
            name: "Ristretto".to_string(),
            volume_ml: 20.0,
            caffeine_mg: 60.0,
        }])
        .unwrap();
        assert!(catalog.lookup("Ristretto").is_some());
        assert!(catalog.lookup("Espresso").is_none());
        assert_eq!(catalog.iter().count(), 1);
    }

    #[test]
    fn standard_catalog_passes_validation() {
        let catalog = CoffeeCatalog::standard();
        assert_eq!(CoffeeCatalog::new(catalog.iter().cloned().collect()).unwrap(), catalog);
    }

    #[test]
    fn rejects_unusable_drinks() {
        let drink = |name: &str, volume_ml, caffeine_mg| CatalogDrink {
            name: name.to_string(),
            volume_ml,
            caffeine_mg,
        };
        assert!(CoffeeCatalog::new(vec![drink(" ", 30.0, 75.0)]).is_err());
        assert!(CoffeeCatalog::new(vec![drink("Shot", 0.0, 75.0)]).is_err());
        assert!(CoffeeCatalog::new(vec![drink("Shot", 30.0, f64::NAN)]).is_err());
        assert!(matches!(
            CoffeeCatalog::new(vec![drink("Shot", 30.0, 75.0), drink("shot", 40.0, 80.0)]),
            Err(ValidationError::InvalidCatalogDrink { .. })
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: CoffeeCatalog = serde_json::from_str(
            r#"{"drinks": [{"name": "Ristretto", "volume_ml": 20.0, "caffeine_mg": 60.0}]}"#,
        )
        .unwrap();
        assert!(ok.lookup("ristretto").is_some());

        let bad = serde_json::from_str::<CoffeeCatalog>(
            r#"{"drinks": [{"name": "Ristretto", "volume_ml": -5.0, "caffeine_mg": 60.0}]}"#,
        );
        assert!(bad.is_err());
    }
}
