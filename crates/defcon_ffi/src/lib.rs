//! Flutter-facing bindings for the Defcon.DO core.

pub mod api;
