//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An entry carries a numeric field that cannot take part in level math.
    #[error("invalid entry {field}: {value}")]
    InvalidEntry { field: &'static str, value: f64 },

    /// A milk modifier has an out-of-range or inconsistent field.
    #[error("invalid milk modifier {name}: {reason}")]
    InvalidMilkModifier { name: String, reason: &'static str },

    /// A new entry referenced a milk modifier the table does not have.
    #[error("unknown milk modifier: {name}")]
    UnknownMilkModifier { name: String },

    /// Two milk modifiers share a name.
    #[error("duplicate milk modifier: {name}")]
    DuplicateMilkModifier { name: String },

    /// A catalog drink has unusable defaults or a duplicate name.
    #[error("invalid catalog drink {name}: {reason}")]
    InvalidCatalogDrink { name: String, reason: &'static str },

    /// A model constant is out of range.
    #[error("invalid model setting {field}: {reason}")]
    InvalidModelConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// A date key did not parse as `YYYY-MM-DD`.
    #[error("invalid date key: {value}")]
    InvalidDateKey { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated coffee entry identifier.
    ///
    /// Entry IDs must be non-empty strings. Generated IDs sort in creation order
    /// (see [`EntryId::generate`]); uniqueness is enforced at the database level.
    EntryId, "entry ID"
);

impl EntryId {
    /// Generates an ID for an entry created at `created_at`.
    ///
    /// The format is `{unix_millis:013}-{8 hex chars}`. IDs generated by one
    /// process are strictly increasing: when the clock has not moved past the
    /// last issued millisecond, the previous millisecond is reused and the
    /// suffix incremented. The suffix starts at a random value so that
    /// separate processes do not collide.
    pub fn generate(created_at: DateTime<Utc>) -> Self {
        static LAST: Mutex<Option<(i64, u32)>> = Mutex::new(None);

        let millis = created_at.timestamp_millis().max(0);
        let mut last = LAST.lock().unwrap_or_else(PoisonError::into_inner);
        let (millis, seq) = match *last {
            Some((last_millis, last_seq)) if millis <= last_millis => {
                match last_seq.checked_add(1) {
                    Some(seq) => (last_millis, seq),
                    None => (last_millis + 1, random_seq()),
                }
            }
            _ => (millis, random_seq()),
        };
        *last = Some((millis, seq));
        Self(format!("{millis:013}-{seq:08x}"))
    }
}

/// Random sequence start, leaving headroom for increments within a millisecond.
#[allow(clippy::cast_possible_truncation)]
fn random_seq() -> u32 {
    (Uuid::new_v4().as_u128() as u32) >> 1
}

/// A calendar day used to group entries into "today" views.
///
/// Serialized as `YYYY-MM-DD`. Computed once from an entry's consumption
/// time in the user's time zone, so later time zone changes never move an
/// entry to another day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    const FORMAT: &'static str = "%Y-%m-%d";

    /// Wraps a calendar date.
    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The local calendar day of `at` in time zone `tz`.
    pub fn for_instant<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> Self {
        Self(at.with_timezone(tz).date_naive())
    }

    /// Returns the underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl FromStr for DateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDateKey {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for DateKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}
