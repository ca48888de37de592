//! State-slot storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Read, replace and clear the single JSON payload holding the document.
//!
//! # Invariants
//! - One slot key, one payload; a save is a single UPSERT.
//! - The store never interprets the payload; parsing and repair belong to
//!   the service and sanitizer layers.
//!
//! # See also
//! - docs/architecture/persistence.md

use crate::db::DbError;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed slot key, carried over from the original document store.
pub const SLOT_KEY: &str = "oficina-do-escritor-data";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for slot operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
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

/// Storage contract for the single workshop document slot.
pub trait StateStore {
    /// Returns the stored payload, or `None` when the slot is empty.
    fn load_raw(&self) -> StoreResult<Option<String>>;
    /// Replaces the slot payload wholesale.
    fn save_raw(&self, payload: &str) -> StoreResult<()>;
    /// Empties the slot. Clearing an already-empty slot is not an error.
    fn clear(&self) -> StoreResult<()>;
}

/// SQLite-backed slot store.
pub struct SqliteStateStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateStore for SqliteStateStore<'_> {
    fn load_raw(&self) -> StoreResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM workshop_slot WHERE slot_key = ?1;",
                [SLOT_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save_raw(&self, payload: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO workshop_slot (slot_key, payload, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(slot_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![SLOT_KEY, payload],
        )?;
        info!(
            "event=slot_save module=store status=ok bytes={}",
            payload.len()
        );
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM workshop_slot WHERE slot_key = ?1;",
            [SLOT_KEY],
        )?;
        info!("event=slot_clear module=store status=ok");
        Ok(())
    }
}
