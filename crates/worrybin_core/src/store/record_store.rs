//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose `read`/`write` over a single named slot of `kv_slots`.
//! - Keep SQL details out of the repository layer.
//!
//! # Invariants
//! - One slot maps to exactly one row keyed by slot name.
//! - `write` is a single upsert statement; the store adds no transaction
//!   layer of its own.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key used when the caller does not configure one.
pub const DEFAULT_SLOT_KEY: &str = "SavedWorries";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by record store implementations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidSlotKey,
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidSlotKey => write!(f, "slot key cannot be empty"),
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidSlotKey | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw byte storage for one serialized collection.
pub trait RecordStore {
    /// Returns the slot content, or `None` when nothing was written yet.
    fn read(&self) -> StoreResult<Option<Vec<u8>>>;
    /// Replaces the slot content.
    fn write(&self, bytes: &[u8]) -> StoreResult<()>;
}

/// SQLite-backed record store bound to one slot key.
pub struct SqliteRecordStore {
    conn: Connection,
    slot_key: String,
}

impl SqliteRecordStore {
    /// Binds a migrated connection to the default `SavedWorries` slot.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }

    /// Binds a migrated connection to a caller-chosen slot.
    pub fn with_slot_key(conn: Connection, slot_key: impl Into<String>) -> StoreResult<Self> {
        let slot_key = slot_key.into();
        if slot_key.trim().is_empty() {
            return Err(StoreError::InvalidSlotKey);
        }
        Ok(Self { conn, slot_key })
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteRecordStore {
    fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [self.slot_key.as_str()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        debug!(
            "event=slot_read module=store status=ok slot={} present={}",
            self.slot_key,
            value.is_some()
        );
        Ok(value)
    }

    fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.slot_key.as_str(), bytes],
        )?;
        debug!(
            "event=slot_write module=store status=ok slot={} bytes={}",
            self.slot_key,
            bytes.len()
        );
        Ok(())
    }
}
