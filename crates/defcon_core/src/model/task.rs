//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its urgency `Level`.
//! - Parse untyped form input into `NewTodo` at the boundary.
//!
//! # Invariants
//! - `timestamp` is set once at creation and never rewritten.
//! - Any integer is a valid `Level`; only 1..=5 are "recognized".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a task within the live list.
pub type TaskId = i64;

/// Urgency level and grouping key.
///
/// Serialized as a bare integer so payloads from the web client load as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub i64);

impl Level {
    /// Levels offered by the add-task form.
    pub const RECOGNIZED: [Level; 5] = [Level(1), Level(2), Level(3), Level(4), Level(5)];

    /// Returns the raw numeric key.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether this level is one of the five offered choices.
    pub fn is_recognized(self) -> bool {
        (1..=5).contains(&self.0)
    }

    /// Human-readable option label, e.g. `Defcon 1`.
    pub fn label(self) -> String {
        format!("Defcon {}", self.0)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the daily list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub level: Level,
    /// Free text; may be empty.
    pub task: String,
    pub completed: bool,
    /// Creation time, Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Task {
    /// Creates an open (not completed) task.
    pub fn new(id: TaskId, level: Level, task: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            level,
            task: task.into(),
            completed: false,
            timestamp,
        }
    }

    /// Returns a copy with `completed` flipped; every other field is kept.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Typed add-task input validated at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub level: Level,
}

impl NewTodo {
    pub fn new(task: impl Into<String>, level: i64) -> Self {
        Self {
            task: task.into(),
            level: Level(level),
        }
    }

    /// Builds input from raw form values.
    ///
    /// Task text is kept unchanged, including empty text. The level text is
    /// trimmed and must parse as an integer; out-of-range values are accepted.
    ///
    /// # Errors
    /// - `InputError::InvalidLevel` when `level_text` is not an integer.
    pub fn parse(task: impl Into<String>, level_text: &str) -> Result<Self, InputError> {
        let trimmed = level_text.trim();
        let level = trimmed
            .parse::<i64>()
            .map_err(|_| InputError::InvalidLevel(trimmed.to_string()))?;
        Ok(Self::new(task, level))
    }
}

/// Boundary input rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    InvalidLevel(String),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(f, "invalid level `{value}`; expected an integer"),
        }
    }
}

impl Error for InputError {}
