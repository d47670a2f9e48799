//! Derived views over the task sequence.
//!
//! Both views are recomputed from scratch by their callers; nothing here
//! caches a previous result.

pub mod deadline;
pub mod grouping;
