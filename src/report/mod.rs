// src/report/mod.rs

//! Per-run record of what happened to each attempted task.
//!
//! Entries appear in execution order. Tasks that were never reached
//! (fail-fast, cancellation) are simply absent.

pub mod printer;

use std::fmt;
use std::time::Duration;

use crate::types::TaskName;

pub use printer::{ConsoleReportPrinter, ReportPrinter};

/// What happened to a task during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// All actions completed.
    Succeeded,
    /// A criterion was false; no actions ran.
    Skipped,
    /// An action failed and no error handler recovered it.
    Failed,
    /// An action failed and the error handler took care of it.
    Delegated,
    /// Dry run: the task would have executed.
    WouldRun,
}

impl TaskOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, TaskOutcome::Failed)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskOutcome::Succeeded => "Succeeded",
            TaskOutcome::Skipped => "Skipped",
            TaskOutcome::Failed => "Failed",
            TaskOutcome::Delegated => "Delegated",
            TaskOutcome::WouldRun => "Would run",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub name: TaskName,
    pub duration: Duration,
    pub outcome: TaskOutcome,
    /// Rendered error for failed tasks.
    pub error: Option<String>,
}

impl TaskResult {
    pub fn new(name: impl Into<String>, duration: Duration, outcome: TaskOutcome) -> Self {
        Self {
            name: name.into(),
            duration,
            outcome,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration,
            outcome: TaskOutcome::Failed,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<TaskResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: TaskResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[TaskResult] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskResult> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TaskResult> {
        self.entries
            .iter()
            .find(|r| crate::types::same_task(&r.name, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|r| r.outcome.is_failure())
    }

    pub fn total_duration(&self) -> Duration {
        self.entries.iter().map(|r| r.duration).sum()
    }

    /// `(name, outcome)` pairs, handy for assertions.
    pub fn outcomes(&self) -> Vec<(&str, TaskOutcome)> {
        self.entries
            .iter()
            .map(|r| (r.name.as_str(), r.outcome))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a TaskResult;
    type IntoIter = std::slice::Iter<'a, TaskResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
