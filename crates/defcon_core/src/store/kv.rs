//! Key-value store contract with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide whole-value get/set over string keys.
//! - Verify a SQLite connection is migrated before using it.
//!
//! # Invariants
//! - `set` replaces the full value of a key; there is no partial update.
//! - `SqliteKeyValueStore` only accepts connections at the latest schema version.

use super::{StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};

const KV_TABLE: &str = "kv_store";
const KV_REQUIRED_COLUMNS: &[&str] = &["key", "value", "updated_at"];

/// Whole-value string storage keyed by name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// SQLite-backed key-value store owning its connection.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   was tampered with.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        ensure_kv_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
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

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

fn ensure_kv_schema(conn: &Connection) -> StoreResult<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({KV_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;

    if columns.is_empty() {
        return Err(StoreError::MissingRequiredTable(KV_TABLE));
    }
    if let Some(column) = KV_REQUIRED_COLUMNS
        .iter()
        .find(|column| !columns.contains(**column))
    {
        return Err(StoreError::MissingRequiredColumn {
            table: KV_TABLE,
            column: *column,
        });
    }
    Ok(())
}

/// Process-local key-value store for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, every `set` fails with `StoreError::WriteRejected`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore};
    use crate::store::StoreError;

    #[test]
    fn memory_store_overwrites_whole_value() {
        let mut store = MemoryKeyValueStore::new();
        store.set("todo", "[1]").unwrap();
        store.set("todo", "[2]").unwrap();
        assert_eq!(store.get("todo").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn memory_store_can_reject_writes() {
        let mut store = MemoryKeyValueStore::new();
        store.set_fail_writes(true);
        let err = store.set("todo", "[]").unwrap_err();
        assert!(matches!(err, StoreError::WriteRejected(key) if key == "todo"));
        assert_eq!(store.get("todo").unwrap(), None);
    }
}
