//! Daily deadline check.
//!
//! # Responsibility
//! - Decide whether a task was created before the current calendar day.
//! - Track the latched "failed" state and its dismissible indicator.
//!
//! # Invariants
//! - Completed tasks are not exempt from the overdue check.
//! - `failed` is never cleared once set; only the indicator can be dismissed.

use crate::model::task::Task;
use chrono::{DateTime, NaiveTime, TimeZone};
use log::{info, warn};

/// Local midnight of the calendar day containing `now`, in epoch ms.
///
/// When midnight does not exist in `now`'s zone (a DST gap), the earliest
/// valid instant of that day is used instead.
pub fn start_of_day_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.timestamp_millis();
    }
    // Gaps are at most a few hours wide; walk forward by the hour.
    (1..=3)
        .filter_map(|hours| {
            let shifted = midnight + chrono::Duration::hours(hours);
            tz.from_local_datetime(&shifted).earliest()
        })
        .next()
        .map_or_else(
            || midnight.and_utc().timestamp_millis(),
            |start| start.timestamp_millis(),
        )
}

/// Whether `task` was created before `start_of_day_ms`.
pub fn is_overdue(task: &Task, start_of_day_ms: i64) -> bool {
    task.timestamp < start_of_day_ms
}

/// Whether any task in the sequence is overdue.
pub fn any_overdue(tasks: &[Task], start_of_day_ms: i64) -> bool {
    tasks.iter().any(|task| is_overdue(task, start_of_day_ms))
}

/// Session-level failure state derived from repeated overdue checks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineMonitor {
    overdue: bool,
    failed: bool,
    indicator_visible: bool,
}

impl DeadlineMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluates the overdue condition for the current sequence.
    ///
    /// A false → true transition latches `failed` and shows the indicator,
    /// even if it was dismissed during an earlier overdue period.
    pub fn observe(&mut self, tasks: &[Task], start_of_day_ms: i64) {
        let overdue_count = tasks
            .iter()
            .filter(|task| is_overdue(task, start_of_day_ms))
            .count();
        let overdue = overdue_count > 0;

        if overdue && !self.overdue {
            self.indicator_visible = true;
            if !self.failed {
                warn!(
                    "event=deadline_failed module=deadline status=failed overdue_count={overdue_count}"
                );
            }
            self.failed = true;
        }
        self.overdue = overdue;
    }

    /// Result of the most recent observation.
    pub fn is_overdue(&self) -> bool {
        self.overdue
    }

    /// Whether the session has ever observed an overdue task.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    /// Hides the indicator; `failed` and `overdue` are untouched.
    pub fn dismiss(&mut self) {
        if self.indicator_visible {
            info!("event=deadline_dismiss module=deadline status=ok");
        }
        self.indicator_visible = false;
    }
}
