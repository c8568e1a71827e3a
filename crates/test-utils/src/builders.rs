#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use taskhost::dag::{TaskBuilder, TaskGraph};

/// Shared, ordered log of things that happened during a test run.
///
/// Clones share the same log, so a clone can be moved into each task
/// closure and inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

/// A task whose single action records its own name.
pub fn recording_task(name: &str, journal: &Journal) -> TaskBuilder {
    let journal = journal.clone();
    let label = name.to_string();
    TaskBuilder::new(name).does(move |_ctx| {
        journal.record(label.clone());
        Ok(())
    })
}

/// A task whose single action records its name and then fails.
pub fn failing_task(name: &str, journal: &Journal) -> TaskBuilder {
    let journal = journal.clone();
    let label = name.to_string();
    TaskBuilder::new(name).does(move |_ctx| {
        journal.record(label.clone());
        Err(anyhow!("{label} exploded"))
    })
}

/// Builder for a `TaskGraph` of recording tasks.
pub struct GraphBuilder {
    journal: Journal,
    tasks: Vec<TaskBuilder>,
}

impl GraphBuilder {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            tasks: Vec::new(),
        }
    }

    /// Add a recording task depending on `deps`, in the given order.
    pub fn with_task(mut self, name: &str, deps: &[&str]) -> Self {
        let mut task = recording_task(name, &self.journal);
        for dep in deps {
            task = task.is_dependent_on(*dep);
        }
        self.tasks.push(task);
        self
    }

    /// Add an arbitrary task.
    pub fn with(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> TaskGraph {
        let mut graph = TaskGraph::new();
        for task in self.tasks {
            graph
                .add_task(task)
                .expect("Failed to build valid graph from builder");
        }
        graph
    }
}

/// `Clean`, `Build` (after `Clean`), `Test` (after `Build`).
pub fn clean_build_test(journal: &Journal) -> GraphBuilder {
    GraphBuilder::new(journal)
        .with_task("Clean", &[])
        .with_task("Build", &["Clean"])
        .with_task("Test", &["Build"])
}
