//! Session services driven by the presentation layer.
//!
//! # Responsibility
//! - Compose repository, clock and derived views into use-case APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod todo_service;
