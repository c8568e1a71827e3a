// src/types.rs

use std::future::Future;
use std::pin::Pin;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Boxed, `Send` future used at the async trait seams (strategies, actions).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Case-folded lookup key for a task name.
///
/// Task names are unique without regard to case, but the spelling used at
/// registration is what gets displayed.
pub fn task_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive task name comparison.
pub fn same_task(a: &str, b: &str) -> bool {
    task_key(a) == task_key(b)
}
