// src/engine/runner.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::dag::{Task, TaskGraph};
use crate::errors::{Result, RunError, TaskhostError};
use crate::report::{Report, TaskOutcome, TaskResult};

use super::strategy::{first_unmet_criterion, ExecutionStrategy};
use super::{ExecutionContext, RunSettings, SetupHook, TeardownHook};

/// Resolves a target against the task graph and drives each task through an
/// [`ExecutionStrategy`], one at a time, in resolved order.
///
/// Guarantees per [`run_target`](Engine::run_target) call:
/// - setup runs once, before any task
/// - a task whose criteria do not hold is handed to
///   [`ExecutionStrategy::skip`] instead of being executed
/// - once setup succeeded, teardown runs exactly once, on every exit path
/// - the first failed task stops the run; later tasks are absent from the
///   report
/// - cancellation is checked between tasks
#[derive(Default)]
pub struct Engine {
    graph: TaskGraph,
    setup: Option<SetupHook>,
    teardown: Option<TeardownHook>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("graph", &self.graph)
            .field("setup", &self.setup.is_some())
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}

impl Engine {
    pub fn new(graph: TaskGraph) -> Self {
        Self {
            graph,
            setup: None,
            teardown: None,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut TaskGraph {
        &mut self.graph
    }

    pub fn register_task(&mut self, task: impl Into<Task>) -> Result<()> {
        self.graph.add_task(task)
    }

    pub fn register_setup<F>(&mut self, f: F)
    where
        F: Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(f));
    }

    pub fn register_teardown<F>(&mut self, f: F)
    where
        F: Fn(&ExecutionContext, &Report) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(f));
    }

    /// Run `settings.target` and everything it depends on.
    ///
    /// Returns the report when every attempted task succeeded, was skipped or
    /// was delegated. Otherwise returns a [`RunError`] carrying the partial
    /// report.
    pub async fn run_target(
        &self,
        ctx: &ExecutionContext,
        strategy: &dyn ExecutionStrategy,
        settings: &RunSettings,
    ) -> std::result::Result<Report, RunError> {
        info!(
            target = %settings.target,
            exclusive = settings.exclusive,
            "starting run"
        );

        if let Err(err) = strategy.setup(ctx, self.setup.as_ref()).await {
            error!(error = %format!("{err:#}"), "setup failed; aborting run");
            return Err(RunError::new(Report::new(), TaskhostError::Setup(err)));
        }

        let mut report = Report::new();
        let result = self.run_tasks(ctx, strategy, settings, &mut report).await;

        if let Err(err) = strategy
            .teardown(ctx, &report, self.teardown.as_ref())
            .await
        {
            error!(error = %format!("{err:#}"), "teardown failed");
        }

        match result {
            Ok(()) => {
                info!(tasks = report.len(), "run finished");
                Ok(report)
            }
            Err(source) => {
                warn!(error = %source, tasks = report.len(), "run did not complete");
                Err(RunError::new(report, source))
            }
        }
    }

    async fn run_tasks(
        &self,
        ctx: &ExecutionContext,
        strategy: &dyn ExecutionStrategy,
        settings: &RunSettings,
        report: &mut Report,
    ) -> Result<()> {
        let tasks = if settings.exclusive {
            self.graph.resolve_exclusive(&settings.target)?
        } else {
            self.graph.resolve(&settings.target)?
        };

        debug!(
            order = ?tasks.iter().map(|t| t.name()).collect::<Vec<_>>(),
            "resolved execution order"
        );

        for task in tasks {
            if ctx.is_cancelled() {
                warn!(task = %task.name(), "run cancelled; not scheduling further tasks");
                return Err(TaskhostError::Cancelled(task.name().to_string()));
            }

            let started = Instant::now();
            let outcome = match first_unmet_criterion(task, ctx) {
                Ok(Some(criterion)) => {
                    strategy.skip(task, criterion.message());
                    Ok(TaskOutcome::Skipped)
                }
                Ok(None) => strategy.execute_task(task, ctx).await,
                Err(err) => Err(err),
            };
            let duration = started.elapsed();

            match outcome {
                Ok(outcome) => {
                    debug!(task = %task.name(), %outcome, ?duration, "task finished");
                    report.push(TaskResult::new(task.name(), duration, outcome));
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(task = %task.name(), error = %message, "task failed");
                    report.push(TaskResult::failed(task.name(), duration, message.clone()));
                    return Err(TaskhostError::TaskFailed {
                        task: task.name().to_string(),
                        message,
                    });
                }
            }
        }

        Ok(())
    }
}
