//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task list operations to Dart via FRB.
//! - Own the single process-wide session so dismiss state survives calls.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Errors are reported inside response envelopes, never thrown.

use defcon_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, FailureState, NewTodo, StoreConfig, Task, TodoService,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

type Session = TodoService<defcon_core::SqliteKeyValueStore>;

struct SessionSlot {
    config: Option<StoreConfig>,
    session: Option<Session>,
}

static SESSION: Mutex<SessionSlot> = Mutex::new(SessionSlot {
    config: None,
    session: None,
});

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// A blank `level` selects the build-mode default.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`; reconfiguration is rejected.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        default_log_level()
    } else {
        level.as_str()
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Points the session at a database file and storage key.
///
/// Drops any open session; the next call reopens with the new settings.
/// A blank `storage_key` keeps the default `todo` key.
///
/// # FFI contract
/// - Sync call, no I/O; the database is opened lazily by the next call.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String, storage_key: Option<String>) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "configure_store failed: db_path cannot be empty".to_string();
    }

    let mut config = StoreConfig {
        db_path: PathBuf::from(trimmed),
        ..StoreConfig::default()
    };
    if let Some(key) = storage_key.map(|key| key.trim().to_string()) {
        if !key.is_empty() {
            config.storage_key = key;
        }
    }

    let mut slot = lock_slot();
    slot.config = Some(config);
    slot.session = None;
    String::new()
}

/// One task as shown in a level group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub level: i64,
    pub task: String,
    pub completed: bool,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

/// Tasks sharing one level, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoGroup {
    pub level: i64,
    /// `Defcon N` label for the level.
    pub label: String,
    pub items: Vec<TodoItem>,
}

/// Deadline flags for the failure overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailureView {
    pub overdue: bool,
    pub failed: bool,
    pub indicator_visible: bool,
}

/// Deadline flags envelope for `failure_state` / `dismiss_failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureResponse {
    pub ok: bool,
    pub failure: FailureView,
    pub message: String,
}

impl FailureResponse {
    fn from_result(operation: &str, result: Result<FailureView, String>) -> Self {
        match result {
            Ok(failure) => Self {
                ok: true,
                failure,
                message: String::new(),
            },
            Err(err) => Self {
                ok: false,
                failure: FailureView::default(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Full board: groups in ascending level order plus failure flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoBoard {
    pub ok: bool,
    pub groups: Vec<TodoGroup>,
    pub failure: FailureView,
    pub message: String,
}

/// Result of a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Id of the created or targeted task.
    pub todo_id: Option<i64>,
    /// `true` when the in-memory change could not be written to storage.
    pub unsaved: bool,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, todo_id: i64, unsaved: bool) -> Self {
        Self {
            ok: true,
            todo_id: Some(todo_id),
            unsaved,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            todo_id: None,
            unsaved: false,
            message: message.into(),
        }
    }
}

/// Adds a task from raw form values.
///
/// `level` must be an integer; task text is stored unchanged.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the created task ID on success; `unsaved` reports a failed write.
#[flutter_rust_bridge::frb(sync)]
pub fn add_todo(task: String, level: String) -> TodoActionResponse {
    let input = match NewTodo::parse(task, &level) {
        Ok(input) => input,
        Err(err) => return TodoActionResponse::failure(format!("add_todo failed: {err}")),
    };
    match with_session(|session| {
        let created = session.add_todo(input);
        (created.id, session.has_unsaved_changes())
    }) {
        Ok((id, unsaved)) => TodoActionResponse::success("Task added.", id, unsaved),
        Err(err) => TodoActionResponse::failure(format!("add_todo failed: {err}")),
    }
}

/// Flips completion of a task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unknown ids succeed as a no-op with message `No such task.`.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_todo(id: i64) -> TodoActionResponse {
    match with_session(|session| (session.toggle_todo(id), session.has_unsaved_changes())) {
        Ok((true, unsaved)) => TodoActionResponse::success("Task toggled.", id, unsaved),
        Ok((false, unsaved)) => TodoActionResponse::success("No such task.", id, unsaved),
        Err(err) => TodoActionResponse::failure(format!("toggle_todo failed: {err}")),
    }
}

/// Removes a task.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unknown ids succeed as a no-op with message `No such task.`.
#[flutter_rust_bridge::frb(sync)]
pub fn remove_todo(id: i64) -> TodoActionResponse {
    match with_session(|session| (session.remove_todo(id), session.has_unsaved_changes())) {
        Ok((true, unsaved)) => TodoActionResponse::success("Task removed.", id, unsaved),
        Ok((false, unsaved)) => TodoActionResponse::success("No such task.", id, unsaved),
        Err(err) => TodoActionResponse::failure(format!("remove_todo failed: {err}")),
    }
}

/// Current grouped board. Re-checks the deadline first so a session left
/// open past midnight reports it.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Groups are in ascending level order; empty levels are absent.
#[flutter_rust_bridge::frb(sync)]
pub fn grouped_todos() -> TodoBoard {
    let result = with_session(|session| {
        session.refresh();
        let groups = session
            .grouped()
            .into_iter()
            .map(|(level, tasks)| TodoGroup {
                level: level.value(),
                label: level.label(),
                items: tasks.iter().map(to_todo_item).collect(),
            })
            .collect::<Vec<_>>();
        (groups, to_failure_view(session.failure_state()))
    });

    match result {
        Ok((groups, failure)) => {
            let message = if groups.is_empty() {
                "C'mon do something.".to_string()
            } else {
                format!("{} level group(s).", groups.len())
            };
            TodoBoard {
                ok: true,
                groups,
                failure,
                message,
            }
        }
        Err(err) => TodoBoard {
            ok: false,
            groups: Vec::new(),
            failure: FailureView::default(),
            message: format!("grouped_todos failed: {err}"),
        },
    }
}

/// Deadline flags without the board payload.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - `ok = false` means the store could not be opened; flags are then unset.
#[flutter_rust_bridge::frb(sync)]
pub fn failure_state() -> FailureResponse {
    let result = with_session(|session| {
        session.refresh();
        to_failure_view(session.failure_state())
    });
    FailureResponse::from_result("failure_state", result)
}

/// Hides the failure overlay until the overdue condition next turns on.
///
/// # FFI contract
/// - Sync call, no storage writes.
/// - Never panics.
/// - `ok = false` means the store could not be opened; nothing was dismissed.
#[flutter_rust_bridge::frb(sync)]
pub fn dismiss_failure() -> FailureResponse {
    let result = with_session(|session| {
        session.dismiss();
        to_failure_view(session.failure_state())
    });
    FailureResponse::from_result("dismiss_failure", result)
}

fn lock_slot() -> MutexGuard<'static, SessionSlot> {
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
    let mut slot = lock_slot();
    if slot.session.is_none() {
        let config = slot.config.clone().unwrap_or_else(StoreConfig::from_env);
        let session = TodoService::open(&config).map_err(|err| {
            warn!(
                "event=session_open module=ffi status=error db_path={} error={}",
                config.db_path.display(),
                err
            );
            format!("store open failed: {err}")
        })?;
        slot.config = Some(config);
        slot.session = Some(session);
    }

    match slot.session.as_mut() {
        Some(session) => Ok(f(session)),
        None => Err("session unavailable".to_string()),
    }
}

fn to_todo_item(task: &Task) -> TodoItem {
    TodoItem {
        id: task.id,
        level: task.level.value(),
        task: task.task.clone(),
        completed: task.completed,
        timestamp: task.timestamp,
    }
}

fn to_failure_view(state: FailureState) -> FailureView {
    FailureView {
        overdue: state.overdue,
        failed: state.failed,
        indicator_visible: state.indicator_visible,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_todo, configure_store, core_version, dismiss_failure, failure_state, grouped_todos,
        init_logging, ping, remove_todo, toggle_todo,
    };
    use rusqlite::Connection;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/defcon-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn configure_store_rejects_blank_path() {
        let error = configure_store("  ".to_string(), None);
        assert!(!error.is_empty());
    }

    #[test]
    fn add_toggle_remove_flow_updates_board_and_storage() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let db_path = unique_db_path("flow");
        assert_eq!(
            configure_store(db_path.display().to_string(), Some("todo-ffi".to_string())),
            ""
        );

        let created = add_todo("Ship release".to_string(), " 1 ".to_string());
        assert!(created.ok, "{}", created.message);
        assert!(!created.unsaved);
        let id = created.todo_id.expect("add should return todo_id");

        let toggled = toggle_todo(id);
        assert!(toggled.ok, "{}", toggled.message);

        let board = grouped_todos();
        assert!(board.ok, "{}", board.message);
        assert_eq!(board.groups.len(), 1);
        assert_eq!(board.groups[0].level, 1);
        assert_eq!(board.groups[0].label, "Defcon 1");
        assert!(board.groups[0].items[0].completed);
        assert!(!board.failure.failed);

        let conn = Connection::open(&db_path).expect("open db");
        let payload: String = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = 'todo-ffi';",
                [],
                |row| row.get(0),
            )
            .expect("query slot");
        assert!(payload.contains("Ship release"));

        let removed = remove_todo(id);
        assert!(removed.ok);
        assert_eq!(removed.message, "Task removed.");
        assert_eq!(remove_todo(id).message, "No such task.");
        assert!(grouped_todos().groups.is_empty());
    }

    #[test]
    fn add_todo_rejects_unparseable_level() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        configure_store(unique_db_path("bad-level").display().to_string(), None);

        let response = add_todo("x".to_string(), "urgent".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid level"));
        assert!(grouped_todos().groups.is_empty());
    }

    #[test]
    fn stale_task_raises_failure_until_dismissed() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let db_path = unique_db_path("stale");
        {
            let conn = defcon_core::db::open_db(&db_path).expect("open db");
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES ('todo', ?1);",
                [r#"[{"id":1,"level":2,"task":"old","completed":true,"timestamp":0}]"#],
            )
            .expect("seed slot");
        }
        configure_store(db_path.display().to_string(), None);

        let state = failure_state();
        assert!(state.ok, "{}", state.message);
        let flags = state.failure;
        assert!(flags.failed && flags.overdue && flags.indicator_visible);

        let dismissed = dismiss_failure();
        assert!(dismissed.ok, "{}", dismissed.message);
        assert!(dismissed.failure.failed);
        assert!(!dismissed.failure.indicator_visible);
        assert!(!grouped_todos().failure.indicator_visible);
    }

    #[test]
    fn unopenable_store_is_reported_by_every_read_call() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let missing_dir = unique_db_path("missing-dir");
        let db_path = missing_dir.join("sub").join("defcon.sqlite3");
        assert_eq!(configure_store(db_path.display().to_string(), None), "");

        let board = grouped_todos();
        assert!(!board.ok);
        assert!(board.message.starts_with("grouped_todos failed"));

        let state = failure_state();
        assert!(!state.ok);
        assert!(state.message.starts_with("failure_state failed"));
        assert!(state.message.contains("store open failed"));

        let dismissed = dismiss_failure();
        assert!(!dismissed.ok);
        assert!(dismissed.message.starts_with("dismiss_failure failed"));
    }

    fn unique_db_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "defcon-ffi-{prefix}-{}-{nanos}.sqlite3",
            std::process::id()
        ))
    }
}
