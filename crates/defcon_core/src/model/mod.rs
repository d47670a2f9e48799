//! Domain model for the daily task list.
//!
//! # Responsibility
//! - Define the canonical task record shared by repository, grouping and
//!   deadline code.
//! - Define the typed input accepted from the presentation boundary.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` unique within the live list.
//! - Wire field names match the persisted slot payload exactly.

pub mod task;
