//! Core domain logic for Defcon.DO, the daily "do it today" task list.
//! This crate is the single source of truth for list, grouping and deadline rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{InputError, Level, NewTodo, Task, TaskId};
pub use repo::task_repo::{IdSource, RandomIdSource, SequentialIdSource, TaskRepository};
pub use service::todo_service::{FailureState, TodoService};
pub use store::kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use store::list_store::{PersistentListStore, DEFAULT_STORAGE_KEY};
pub use store::{StoreError, StoreResult};
pub use view::deadline::{any_overdue, is_overdue, start_of_day_ms, DeadlineMonitor};
pub use view::grouping::{group_by_level, GroupedTasks};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
