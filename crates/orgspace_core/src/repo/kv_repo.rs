//! Durable key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Provide whole-value read/write of string records by key.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `write` replaces the full value for a key; there are no partial writes.
//! - `read` of a missing key is `Ok(None)`, never an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Error for durable key-value reads and writes.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Connection was not bootstrapped through `open_db*`.
    NotReady(&'static str),
    /// Backend refused the operation (quota, read-only medium, ...).
    Unavailable(String),
    /// Value could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotReady(details) => write!(f, "storage not ready: {details}"),
            Self::Unavailable(details) => write!(f, "storage unavailable: {details}"),
            Self::Encode(err) => write!(f, "failed to encode stored value: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotReady(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage interface for one-record-per-key durable state.
pub trait KeyValueStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &T {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

/// SQLite-backed key-value storage over the `kv_store` table.
pub struct SqliteKeyValueStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStorage<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `NotReady` when the `kv_store` table is missing.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'
            );",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::NotReady("kv_store table is missing"));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStorage for SqliteKeyValueStorage<'_> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw record, bypassing any encoding.
    pub fn with_record(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.records.borrow_mut().insert(key.into(), value.into());
        storage
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStorage, MemoryKeyValueStorage, SqliteKeyValueStorage, StorageError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn sqlite_storage_overwrites_existing_key() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();

        assert_eq!(storage.read("k").unwrap(), None);
        storage.write("k", "one").unwrap();
        storage.write("k", "two").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("two"));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn sqlite_storage_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKeyValueStorage::try_new(&conn).err().unwrap();
        assert!(matches!(err, StorageError::NotReady(_)));
    }

    #[test]
    fn memory_storage_reads_back_writes() {
        let storage = MemoryKeyValueStorage::with_record("a", "1");
        storage.write("b", "2").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("b").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.read("c").unwrap(), None);
    }
}
