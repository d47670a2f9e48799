//! In-memory task repository backed by the single-slot list store.
//!
//! # Responsibility
//! - Own the authoritative task sequence for one session.
//! - Write the whole sequence back after every mutation.
//!
//! # Invariants
//! - Ids are unique within the live sequence.
//! - Sequence order is insertion order.
//! - A failed write never rolls back memory; it is logged and remembered
//!   until the next successful write.

use crate::model::task::{NewTodo, Task, TaskId};
use crate::store::kv::KeyValueStore;
use crate::store::list_store::PersistentListStore;
use log::{error, info};
use std::collections::HashSet;
use uuid::Uuid;

/// Upper bound (exclusive) of randomly drawn ids.
pub const RANDOM_ID_UPPER: i64 = 100_000_000;
const MAX_ID_ATTEMPTS: usize = 16;

/// Supplies candidate ids; the repository rejects candidates already in use.
pub trait IdSource {
    fn next_candidate(&mut self) -> TaskId;
}

/// Draws ids in `[1, RANDOM_ID_UPPER)` from UUID v4 entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_candidate(&mut self) -> TaskId {
        let span = (RANDOM_ID_UPPER - 1) as u128;
        1 + (Uuid::new_v4().as_u128() % span) as i64
    }
}

/// Hands out `start, start + 1, ...`.
#[derive(Debug, Clone, Copy)]
pub struct SequentialIdSource {
    next: TaskId,
}

impl SequentialIdSource {
    pub fn starting_at(next: TaskId) -> Self {
        Self { next }
    }
}

impl IdSource for SequentialIdSource {
    fn next_candidate(&mut self) -> TaskId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Session-scoped task list with write-through persistence.
pub struct TaskRepository<S: KeyValueStore, I: IdSource = RandomIdSource> {
    store: PersistentListStore<S>,
    ids: I,
    tasks: Vec<Task>,
    unsaved: bool,
}

impl<S: KeyValueStore> TaskRepository<S, RandomIdSource> {
    /// Loads the persisted sequence and uses random ids.
    pub fn load(store: PersistentListStore<S>) -> Self {
        Self::load_with_ids(store, RandomIdSource)
    }
}

impl<S: KeyValueStore, I: IdSource> TaskRepository<S, I> {
    pub fn load_with_ids(store: PersistentListStore<S>, ids: I) -> Self {
        let tasks = store.read();
        info!(
            "event=repo_load module=repo status=ok key={} count={}",
            store.key(),
            tasks.len()
        );
        Self {
            store,
            ids,
            tasks,
            unsaved: false,
        }
    }

    /// Current sequence in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Whether the last write to the store failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn list_store(&self) -> &PersistentListStore<S> {
        &self.store
    }

    pub fn list_store_mut(&mut self) -> &mut PersistentListStore<S> {
        &mut self.store
    }

    /// Appends a new open task created at `now_ms` and persists.
    pub fn add(&mut self, input: NewTodo, now_ms: i64) -> Task {
        let id = self.allocate_id();
        let task = Task::new(id, input.level, input.task, now_ms);

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.extend(self.tasks.iter().cloned());
        next.push(task.clone());
        self.replace(next);

        task
    }

    /// Flips `completed` on the matching task. Returns `false` and leaves the
    /// store untouched when no task has `id`.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .tasks
            .iter()
            .map(|task| if task.id == id { task.toggled() } else { task.clone() })
            .collect();
        self.replace(next);
        true
    }

    /// Drops the matching task. Returns `false` when no task has `id`.
    pub fn remove(&mut self, id: TaskId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.replace(next);
        true
    }

    fn replace(&mut self, next: Vec<Task>) {
        self.tasks = next;
        match self.store.write(&self.tasks) {
            Ok(()) => self.unsaved = false,
            Err(err) => {
                self.unsaved = true;
                error!(
                    "event=list_write module=repo status=error key={} count={} error_code=store_write_failed error={}",
                    self.store.key(),
                    self.tasks.len(),
                    err
                );
            }
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        let taken: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_candidate();
            if !taken.contains(&candidate) {
                return candidate;
            }
        }
        // The source kept colliding; step past the largest live id instead.
        taken.iter().copied().max().map_or(1, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdSource, RandomIdSource, SequentialIdSource, TaskRepository, RANDOM_ID_UPPER};
    use crate::model::task::{Level, NewTodo, Task};
    use crate::store::kv::MemoryKeyValueStore;
    use crate::store::list_store::PersistentListStore;

    struct StuckIdSource;

    impl IdSource for StuckIdSource {
        fn next_candidate(&mut self) -> i64 {
            5
        }
    }

    fn repo_with<I: IdSource>(ids: I) -> TaskRepository<MemoryKeyValueStore, I> {
        TaskRepository::load_with_ids(PersistentListStore::new(MemoryKeyValueStore::new()), ids)
    }

    #[test]
    fn random_ids_stay_in_range() {
        let mut ids = RandomIdSource;
        for _ in 0..256 {
            let id = ids.next_candidate();
            assert!((1..RANDOM_ID_UPPER).contains(&id));
        }
    }

    #[test]
    fn colliding_source_falls_back_to_next_free_id() {
        let mut repo = repo_with(StuckIdSource);
        let first = repo.add(NewTodo::new("a", 1), 0);
        let second = repo.add(NewTodo::new("b", 1), 0);
        assert_eq!(first.id, 5);
        assert_eq!(second.id, 6);
    }

    #[test]
    fn sequential_ids_skip_ids_already_loaded() {
        let mut store = PersistentListStore::new(MemoryKeyValueStore::new());
        store.write(&[Task::new(1, Level(1), "loaded", 0)]).unwrap();

        let mut repo = TaskRepository::load_with_ids(store, SequentialIdSource::starting_at(1));
        let added = repo.add(NewTodo::new("fresh", 1), 0);

        assert_eq!(added.id, 2);
        assert_eq!(repo.tasks().len(), 2);
    }

    #[test]
    fn failed_write_keeps_memory_and_flags_unsaved() {
        let mut repo = repo_with(SequentialIdSource::starting_at(1));
        repo.list_store_mut().store_mut().set_fail_writes(true);

        let task = repo.add(NewTodo::new("offline", 2), 0);
        assert_eq!(repo.tasks(), std::slice::from_ref(&task));
        assert!(repo.has_unsaved_changes());
        assert!(repo.list_store().read().is_empty());

        repo.list_store_mut().store_mut().set_fail_writes(false);
        assert!(repo.toggle(task.id));
        assert!(!repo.has_unsaved_changes());
        assert_eq!(repo.list_store().read().len(), 1);
    }

    #[test]
    fn toggle_and_remove_of_unknown_id_are_noops() {
        let mut repo = repo_with(SequentialIdSource::starting_at(1));
        repo.add(NewTodo::new("a", 1), 0);
        assert!(!repo.toggle(99));
        assert!(!repo.remove(99));
        assert_eq!(repo.tasks().len(), 1);
        assert!(!repo.tasks()[0].completed);
    }
}
