// src/dag/mod.rs

//! Task descriptors and the task graph.
//!
//! - [`task`] holds the immutable [`Task`] record and its builder.
//! - [`graph`] owns registration, dependee normalisation and resolution of
//!   the ordered run-list for a target.

pub mod graph;
pub mod task;

pub use graph::TaskGraph;
pub use task::{Criterion, ErrorHandler, Task, TaskAction, TaskBuilder, TaskDependency};
