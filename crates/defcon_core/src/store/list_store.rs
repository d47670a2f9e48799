//! Single-slot persistence for the task list.
//!
//! # Responsibility
//! - Serialize the whole task sequence into one key-value entry.
//! - Degrade any read problem to an empty list.
//!
//! # Invariants
//! - `write` always rewrites the full sequence under the same key.
//! - `read` never returns an error; problems are logged at `warn`.

use super::kv::KeyValueStore;
use super::StoreResult;
use crate::model::task::Task;
use log::{debug, warn};

/// Storage key used by the web client for the task list.
pub const DEFAULT_STORAGE_KEY: &str = "todo";

/// Task list persisted under a single key of a `KeyValueStore`.
pub struct PersistentListStore<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistentListStore<S> {
    /// Uses `DEFAULT_STORAGE_KEY`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads the persisted sequence, or an empty one when the slot is
    /// missing, unreadable or not a task array.
    pub fn read(&self) -> Vec<Task> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=list_read module=store status=empty key={}", self.key);
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=list_read module=store status=fallback key={} error_code=store_read_failed error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                debug!(
                    "event=list_read module=store status=ok key={} count={}",
                    self.key,
                    tasks.len()
                );
                tasks
            }
            Err(err) => {
                warn!(
                    "event=list_read module=store status=fallback key={} error_code=payload_invalid error={}",
                    self.key, err
                );
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with the full sequence.
    ///
    /// # Errors
    /// - `StoreError::Serialize` if encoding fails.
    /// - Any error returned by the underlying store.
    pub fn write(&mut self, tasks: &[Task]) -> StoreResult<()> {
        let payload = serde_json::to_string(tasks)?;
        self.store.set(&self.key, &payload)?;
        debug!(
            "event=list_write module=store status=ok key={} count={}",
            self.key,
            tasks.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistentListStore, DEFAULT_STORAGE_KEY};
    use crate::model::task::{Level, Task};
    use crate::store::kv::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn missing_key_reads_as_empty() {
        let store = PersistentListStore::new(MemoryKeyValueStore::new());
        assert!(store.read().is_empty());
        assert_eq!(store.key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn malformed_payload_reads_as_empty() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = PersistentListStore::new(kv);
        assert!(store.read().is_empty());
    }

    #[test]
    fn wrong_shape_reads_as_empty() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(DEFAULT_STORAGE_KEY, r#"{"id": 1}"#).unwrap();
        let store = PersistentListStore::new(kv);
        assert!(store.read().is_empty());
    }

    #[test]
    fn write_replaces_previous_sequence() {
        let mut store = PersistentListStore::new(MemoryKeyValueStore::new());
        let first = Task::new(1, Level(1), "a", 10);
        let second = Task::new(2, Level(2), "b", 20);

        store.write(&[first.clone(), second]).unwrap();
        store.write(std::slice::from_ref(&first)).unwrap();

        assert_eq!(store.read(), vec![first]);
    }

    #[test]
    fn custom_key_is_isolated_from_default() {
        let mut store = PersistentListStore::with_key(MemoryKeyValueStore::new(), "todo-test");
        store.write(&[Task::new(1, Level(3), "c", 30)]).unwrap();
        assert_eq!(store.store().get(DEFAULT_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.read().len(), 1);
    }
}
