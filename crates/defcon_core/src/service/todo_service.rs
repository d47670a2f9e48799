//! Todo session service.
//!
//! # Responsibility
//! - Own one session's repository, clock and deadline monitor.
//! - Expose the add/toggle/remove/grouped/failure operations the
//!   presentation layer drives.
//!
//! # Invariants
//! - The deadline monitor is re-run after every mutation.
//! - Grouped views are recomputed on each request, never cached.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::db::open_db;
use crate::model::task::{NewTodo, Task, TaskId};
use crate::repo::task_repo::{IdSource, RandomIdSource, TaskRepository};
use crate::store::kv::{KeyValueStore, SqliteKeyValueStore};
use crate::store::list_store::PersistentListStore;
use crate::store::StoreResult;
use crate::view::deadline::DeadlineMonitor;
use crate::view::grouping::{group_by_level, GroupedTasks};

/// Snapshot of the deadline state for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureState {
    /// Some task was created before today, as of the last check.
    pub overdue: bool,
    /// The session has observed an overdue task at least once.
    pub failed: bool,
    /// The blocking indicator should be shown.
    pub indicator_visible: bool,
}

/// Explicit per-session state behind the task list UI.
pub struct TodoService<S: KeyValueStore, C: Clock = SystemClock, I: IdSource = RandomIdSource> {
    repo: TaskRepository<S, I>,
    clock: C,
    monitor: DeadlineMonitor,
}

impl TodoService<SqliteKeyValueStore, SystemClock, RandomIdSource> {
    /// Opens (and migrates) the configured database and loads the list.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn = open_db(&config.db_path)?;
        let kv = SqliteKeyValueStore::try_new(conn)?;
        let store = PersistentListStore::with_key(kv, config.storage_key.clone());
        Ok(Self::new(TaskRepository::load(store), SystemClock))
    }
}

impl<S: KeyValueStore, C: Clock, I: IdSource> TodoService<S, C, I> {
    /// Starts a session and runs the first deadline check on loaded tasks.
    pub fn new(repo: TaskRepository<S, I>, clock: C) -> Self {
        let mut service = Self {
            repo,
            clock,
            monitor: DeadlineMonitor::new(),
        };
        service.refresh();
        service
    }

    pub fn add_todo(&mut self, input: NewTodo) -> Task {
        let task = self.repo.add(input, self.clock.now_ms());
        self.refresh();
        task
    }

    /// Returns `false` when `id` is unknown.
    pub fn toggle_todo(&mut self, id: TaskId) -> bool {
        let changed = self.repo.toggle(id);
        self.refresh();
        changed
    }

    /// Returns `false` when `id` is unknown.
    pub fn remove_todo(&mut self, id: TaskId) -> bool {
        let changed = self.repo.remove(id);
        self.refresh();
        changed
    }

    pub fn todos(&self) -> &[Task] {
        self.repo.tasks()
    }

    pub fn grouped(&self) -> GroupedTasks {
        group_by_level(self.repo.tasks())
    }

    /// Re-checks the deadline against the clock's current day.
    pub fn refresh(&mut self) {
        let start_of_today = self.clock.start_of_today_ms();
        self.monitor.observe(self.repo.tasks(), start_of_today);
    }

    pub fn is_overdue(&self) -> bool {
        self.monitor.is_overdue()
    }

    pub fn is_failed(&self) -> bool {
        self.monitor.is_failed()
    }

    pub fn indicator_visible(&self) -> bool {
        self.monitor.indicator_visible()
    }

    pub fn failure_state(&self) -> FailureState {
        FailureState {
            overdue: self.monitor.is_overdue(),
            failed: self.monitor.is_failed(),
            indicator_visible: self.monitor.indicator_visible(),
        }
    }

    pub fn dismiss(&mut self) {
        self.monitor.dismiss();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.repo.has_unsaved_changes()
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn repository(&self) -> &TaskRepository<S, I> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut TaskRepository<S, I> {
        &mut self.repo
    }
}
