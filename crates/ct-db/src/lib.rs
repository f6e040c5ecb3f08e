//! Storage layer for the caffeine tracker.
//!
//! Provides persistence for coffee entries using `rusqlite`. The model in
//! `ct-core` never touches storage: callers load the entry list, compute, and
//! write changes back through this crate.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! Every write runs in its own transaction, so two processes appending entries
//! at the same time cannot lose each other's updates.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2025-03-01T09:00:00.000Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Date Keys
//!
//! `date_key` is stored as computed at logging time and is never re-derived
//! from `consumed_at`, so changing time zones does not move entries between days.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use ct_core::{CoffeeEntry, DateKey, EntryId, ValidationError};
use rusqlite::{Connection, Row, Transaction, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an entry timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored or incoming entry failed validation.
    #[error("invalid entry {entry_id}")]
    InvalidEntry {
        entry_id: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const SELECT_ENTRIES: &str = "
    SELECT id, drink_type, volume_ml, base_caffeine_mg, effective_caffeine_mg,
           consumed_at, milk, date_key
    FROM entries
";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(std::time::Duration::from_secs(5))?;
        self.conn.execute_batch(
            "
            -- Entries table: one row per logged drink
            -- consumed_at: RFC 3339 UTC (e.g., '2025-03-01T09:00:00.000Z')
            -- date_key: local calendar day at logging time (e.g., '2025-03-01')
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                drink_type TEXT NOT NULL,
                volume_ml REAL NOT NULL,
                base_caffeine_mg REAL NOT NULL,
                effective_caffeine_mg REAL NOT NULL,
                consumed_at TEXT NOT NULL,
                milk TEXT NOT NULL,
                date_key TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date_key ON entries(date_key);
            CREATE INDEX IF NOT EXISTS idx_entries_consumed_at ON entries(consumed_at);
            ",
        )?;
        Ok(())
    }

    /// Loads every entry ordered by consumption time then ID.
    pub fn load_entries(&self) -> Result<Vec<CoffeeEntry>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ENTRIES} ORDER BY consumed_at ASC, id ASC"))?;
        let rows = stmt.query_map([], RawEntry::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Loads entries logged on `date_key`, ordered by consumption time then ID.
    pub fn entries_for_day(&self, date_key: &DateKey) -> Result<Vec<CoffeeEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_ENTRIES} WHERE date_key = ? ORDER BY consumed_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([date_key.to_string()], RawEntry::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Replaces the stored entry list with `entries` in one transaction.
    pub fn save_entries(&mut self, entries: &[CoffeeEntry]) -> Result<(), DbError> {
        for entry in entries {
            validate(entry)?;
        }
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        insert_all(&tx, entries)?;
        tx.commit()?;
        tracing::debug!(count = entries.len(), "saved entries");
        Ok(())
    }

    /// Appends one entry. Returns false if an entry with the same ID exists.
    pub fn add_entry(&mut self, entry: &CoffeeEntry) -> Result<bool, DbError> {
        Ok(self.add_entries(std::slice::from_ref(entry))? == 1)
    }

    /// Appends entries, ignoring duplicates by ID. Returns how many were inserted.
    pub fn add_entries(&mut self, entries: &[CoffeeEntry]) -> Result<usize, DbError> {
        if entries.is_empty() {
            return Ok(0);
        }
        for entry in entries {
            validate(entry)?;
        }
        let tx = self.conn.transaction()?;
        let inserted = insert_all(&tx, entries)?;
        tx.commit()?;
        tracing::debug!(inserted, "added entries");
        Ok(inserted)
    }

    /// Removes an entry. Returns false if no entry had that ID.
    pub fn remove_entry(&mut self, id: &EntryId) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?", [id.as_str()])?;
        Ok(removed > 0)
    }

    /// Finds entries whose ID starts with `prefix`.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Result<Vec<CoffeeEntry>, DbError> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_ENTRIES} WHERE id LIKE ? ESCAPE '\\' ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([format!("{escaped}%")], RawEntry::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }
}

fn validate(entry: &CoffeeEntry) -> Result<(), DbError> {
    entry.validate().map_err(|source| DbError::InvalidEntry {
        entry_id: entry.id.to_string(),
        source,
    })
}

fn insert_all(tx: &Transaction<'_>, entries: &[CoffeeEntry]) -> Result<usize, DbError> {
    let mut stmt = tx.prepare(
        "
        INSERT OR IGNORE INTO entries
        (id, drink_type, volume_ml, base_caffeine_mg, effective_caffeine_mg, consumed_at, milk, date_key)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )?;
    let mut inserted = 0;
    for entry in entries {
        inserted += stmt.execute(params![
            entry.id.as_str(),
            entry.drink_type,
            entry.volume_ml,
            entry.base_caffeine_mg,
            entry.effective_caffeine_mg,
            format_timestamp(entry.consumed_at),
            entry.milk,
            entry.date_key.to_string(),
        ])?;
    }
    Ok(inserted)
}

/// A row as stored, before parsing into typed fields.
struct RawEntry {
    id: String,
    drink_type: String,
    volume_ml: f64,
    base_caffeine_mg: f64,
    effective_caffeine_mg: f64,
    consumed_at: String,
    milk: String,
    date_key: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            drink_type: row.get(1)?,
            volume_ml: row.get(2)?,
            base_caffeine_mg: row.get(3)?,
            effective_caffeine_mg: row.get(4)?,
            consumed_at: row.get(5)?,
            milk: row.get(6)?,
            date_key: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<CoffeeEntry, DbError> {
        let invalid = |source: ValidationError| DbError::InvalidEntry {
            entry_id: self.id.clone(),
            source,
        };
        let id = EntryId::new(self.id.clone()).map_err(invalid)?;
        let date_key: DateKey = self.date_key.parse().map_err(invalid)?;
        let consumed_at = parse_timestamp(&self.consumed_at, &self.id)?;

        Ok(CoffeeEntry {
            id,
            drink_type: self.drink_type,
            volume_ml: self.volume_ml,
            base_caffeine_mg: self.base_caffeine_mg,
            effective_caffeine_mg: self.effective_caffeine_mg,
            consumed_at,
            milk: self.milk,
            date_key,
        })
    }
}

fn parse_timestamp(timestamp: &str, entry_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id: entry_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
