//! Repository layer over the persisted task list.
//!
//! # Responsibility
//! - Hold the session's authoritative task sequence.
//! - Isolate persistence details from service orchestration.

pub mod task_repo;
