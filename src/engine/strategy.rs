// src/engine/strategy.rs

//! Pluggable execution strategy.
//!
//! The engine decides *what* runs and in which order, and evaluates each
//! task's criteria. The strategy decides *how* a task that is due (and the
//! run-level setup/teardown) is carried out, and is told about every skip.
//!
//! - [`DefaultExecutionStrategy`] runs actions, error handlers, finally
//!   blocks and user hooks.
//! - [`DryRunExecutionStrategy`] logs what would run but never runs anything.
//!
//! The seam is also where instrumentation goes: wrap a strategy to observe
//! every call.

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::dag::{Criterion, Task};
use crate::engine::{ExecutionContext, SetupHook, TeardownHook};
use crate::report::{Report, TaskOutcome};
use crate::types::BoxFuture;

/// How a run's setup, teardown and individual tasks are carried out.
///
/// `execute_task` is only called for tasks whose criteria all hold. It
/// returns `Err` when the task failed and nothing recovered it; the engine
/// records that as [`TaskOutcome::Failed`].
pub trait ExecutionStrategy: Send + Sync {
    fn setup<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        hook: Option<&'a SetupHook>,
    ) -> BoxFuture<'a, Result<()>>;

    fn teardown<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        report: &'a Report,
        hook: Option<&'a TeardownHook>,
    ) -> BoxFuture<'a, Result<()>>;

    fn execute_task<'a>(
        &'a self,
        task: &'a Task,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<TaskOutcome>>;

    /// Called by the engine instead of `execute_task` for a task whose
    /// criteria did not hold. `reason` is the failing criterion's message.
    fn skip(&self, task: &Task, reason: Option<&str>);
}

/// First criterion of `task` that evaluates to false, if any.
///
/// Criteria are evaluated in declaration order and evaluation stops at the
/// first false one.
pub fn first_unmet_criterion<'t>(
    task: &'t Task,
    ctx: &ExecutionContext,
) -> Result<Option<&'t Criterion>> {
    for criterion in task.criteria() {
        let holds = criterion
            .evaluate(ctx)
            .with_context(|| format!("evaluating criteria of task '{}'", task.name()))?;
        if !holds {
            return Ok(Some(criterion));
        }
    }
    Ok(None)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExecutionStrategy;

impl DefaultExecutionStrategy {
    pub fn new() -> Self {
        Self
    }

    async fn run_task(&self, task: &Task, ctx: &ExecutionContext) -> Result<TaskOutcome> {
        info!(task = %task.name(), "executing task");

        let outcome = match run_actions(task, ctx).await {
            Ok(()) => Ok(TaskOutcome::Succeeded),
            Err(err) => match task.error_handler() {
                Some(handler) => {
                    warn!(
                        task = %task.name(),
                        error = %format!("{err:#}"),
                        "task failed; invoking error handler"
                    );
                    handler
                        .invoke(err, ctx)
                        .await
                        .map(|()| TaskOutcome::Delegated)
                        .with_context(|| {
                            format!("error handler of task '{}' failed", task.name())
                        })
                }
                None => Err(err),
            },
        };

        if let Some(finally) = task.finally() {
            debug!(task = %task.name(), "running finally block");
            if let Err(err) = finally.invoke(ctx).await {
                error!(
                    task = %task.name(),
                    error = %format!("{err:#}"),
                    "finally block failed"
                );
            }
        }

        outcome
    }
}

async fn run_actions(task: &Task, ctx: &ExecutionContext) -> Result<()> {
    for (i, action) in task.actions().iter().enumerate() {
        debug!(task = %task.name(), action = i, "invoking action");
        action.invoke(ctx).await?;
    }
    Ok(())
}

impl ExecutionStrategy for DefaultExecutionStrategy {
    fn setup<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        hook: Option<&'a SetupHook>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(hook) = hook {
                info!("executing setup");
                hook(ctx)?;
            }
            Ok(())
        })
    }

    fn teardown<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        report: &'a Report,
        hook: Option<&'a TeardownHook>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(hook) = hook {
                info!("executing teardown");
                hook(ctx, report)?;
            }
            Ok(())
        })
    }

    fn execute_task<'a>(
        &'a self,
        task: &'a Task,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<TaskOutcome>> {
        Box::pin(self.run_task(task, ctx))
    }

    fn skip(&self, task: &Task, reason: Option<&str>) {
        match reason {
            Some(reason) => info!(task = %task.name(), %reason, "skipping task"),
            None => info!(task = %task.name(), "skipping task: criteria not met"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutionStrategy;

impl DryRunExecutionStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionStrategy for DryRunExecutionStrategy {
    fn setup<'a>(
        &'a self,
        _ctx: &'a ExecutionContext,
        hook: Option<&'a SetupHook>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if hook.is_some() {
                info!("dry run: not executing setup");
            }
            Ok(())
        })
    }

    fn teardown<'a>(
        &'a self,
        _ctx: &'a ExecutionContext,
        _report: &'a Report,
        hook: Option<&'a TeardownHook>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if hook.is_some() {
                info!("dry run: not executing teardown");
            }
            Ok(())
        })
    }

    fn execute_task<'a>(
        &'a self,
        task: &'a Task,
        _ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<TaskOutcome>> {
        Box::pin(async move {
            info!(task = %task.name(), "dry run: would execute task");
            Ok(TaskOutcome::WouldRun)
        })
    }

    fn skip(&self, task: &Task, reason: Option<&str>) {
        info!(task = %task.name(), reason = reason.unwrap_or("criteria not met"), "dry run: would skip task");
    }
}
