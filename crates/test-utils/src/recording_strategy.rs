use anyhow::Result;
use taskhost::dag::Task;
use taskhost::engine::{ExecutionContext, ExecutionStrategy, SetupHook, TeardownHook};
use taskhost::report::{Report, TaskOutcome};
use taskhost::types::BoxFuture;

use crate::builders::Journal;

/// Wraps another strategy and journals the calls the engine makes to it:
/// `setup`, `teardown`, `execute:<task>`, `skip:<task>`.
pub struct RecordingStrategy<S> {
    inner: S,
    journal: Journal,
}

impl<S: ExecutionStrategy> RecordingStrategy<S> {
    pub fn new(inner: S, journal: &Journal) -> Self {
        Self {
            inner,
            journal: journal.clone(),
        }
    }
}

impl<S: ExecutionStrategy> ExecutionStrategy for RecordingStrategy<S> {
    fn setup<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        hook: Option<&'a SetupHook>,
    ) -> BoxFuture<'a, Result<()>> {
        self.journal.record("setup");
        self.inner.setup(ctx, hook)
    }

    fn teardown<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        report: &'a Report,
        hook: Option<&'a TeardownHook>,
    ) -> BoxFuture<'a, Result<()>> {
        self.journal.record("teardown");
        self.inner.teardown(ctx, report, hook)
    }

    fn execute_task<'a>(
        &'a self,
        task: &'a Task,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<TaskOutcome>> {
        self.journal.record(format!("execute:{}", task.name()));
        self.inner.execute_task(task, ctx)
    }

    fn skip(&self, task: &Task, reason: Option<&str>) {
        self.journal.record(format!("skip:{}", task.name()));
        self.inner.skip(task, reason);
    }
}
