// src/dag/task.rs

//! Task descriptors and the fluent [`TaskBuilder`] used to register them.
//!
//! A [`Task`] is immutable once built. The only change that happens after
//! registration is the graph appending dependency edges to it when a later
//! task declares itself a dependee of this one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::engine::ExecutionContext;
use crate::types::{same_task, BoxFuture, TaskName};

type SyncActionFn = dyn Fn(&ExecutionContext) -> Result<()> + Send + Sync;
type AsyncActionFn = dyn Fn(ExecutionContext) -> BoxFuture<'static, Result<()>> + Send + Sync;
type SyncHandlerFn = dyn Fn(&anyhow::Error, &ExecutionContext) -> Result<()> + Send + Sync;
type AsyncHandlerFn =
    dyn Fn(String, ExecutionContext) -> BoxFuture<'static, Result<()>> + Send + Sync;
type PredicateFn = dyn Fn(&ExecutionContext) -> Result<bool> + Send + Sync;

/// A unit of work attached to a task (an action or a finally block).
#[derive(Clone)]
pub enum TaskAction {
    Sync(Arc<SyncActionFn>),
    Async(Arc<AsyncActionFn>),
}

impl TaskAction {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        TaskAction::Sync(Arc::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        TaskAction::Async(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Run the action to completion.
    pub async fn invoke(&self, ctx: &ExecutionContext) -> Result<()> {
        match self {
            TaskAction::Sync(f) => f(ctx),
            TaskAction::Async(f) => f(ctx.clone()).await,
        }
    }
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Sync(_) => f.write_str("TaskAction::Sync(..)"),
            TaskAction::Async(_) => f.write_str("TaskAction::Async(..)"),
        }
    }
}

/// Invoked with the error of a failing action. A task with a handler keeps
/// the run going.
///
/// Async handlers receive the rendered error message rather than the error
/// itself, since the future has to be `'static`.
#[derive(Clone)]
pub enum ErrorHandler {
    Sync(Arc<SyncHandlerFn>),
    Async(Arc<AsyncHandlerFn>),
}

impl ErrorHandler {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&anyhow::Error, &ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        ErrorHandler::Sync(Arc::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        ErrorHandler::Async(Arc::new(move |message, ctx| Box::pin(f(message, ctx))))
    }

    pub async fn invoke(&self, error: anyhow::Error, ctx: &ExecutionContext) -> Result<()> {
        match self {
            ErrorHandler::Sync(f) => f(&error, ctx),
            ErrorHandler::Async(f) => f(format!("{error:#}"), ctx.clone()).await,
        }
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorHandler::Sync(_) => f.write_str("ErrorHandler::Sync(..)"),
            ErrorHandler::Async(_) => f.write_str("ErrorHandler::Async(..)"),
        }
    }
}

/// A predicate gating whether a task's actions run.
#[derive(Clone)]
pub struct Criterion {
    predicate: Arc<PredicateFn>,
    message: Option<String>,
}

impl Criterion {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&ExecutionContext) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |ctx| Ok(predicate(ctx)))
    }

    /// A predicate that can itself fail. An error here fails the task.
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Message logged when this criterion causes the task to be skipped.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn evaluate(&self, ctx: &ExecutionContext) -> Result<bool> {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// One ordering edge toward another task.
///
/// A missing `required` dependency fails resolution; a missing optional one
/// is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDependency {
    pub name: TaskName,
    pub required: bool,
}

impl TaskDependency {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

impl From<&str> for TaskDependency {
    fn from(name: &str) -> Self {
        TaskDependency::required(name)
    }
}

impl From<String> for TaskDependency {
    fn from(name: String) -> Self {
        TaskDependency::required(name)
    }
}

/// A registered unit of work.
#[derive(Debug, Clone)]
pub struct Task {
    name: TaskName,
    description: Option<String>,
    actions: Vec<TaskAction>,
    criteria: Vec<Criterion>,
    error_handler: Option<ErrorHandler>,
    finally: Option<TaskAction>,
    /// Tasks that must run before this one, in declaration order.
    dependencies: Vec<TaskDependency>,
    /// Tasks that must run after this one.
    dependees: Vec<TaskDependency>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            actions: Vec::new(),
            criteria: Vec::new(),
            error_handler: None,
            finally: None,
            dependencies: Vec::new(),
            dependees: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn actions(&self) -> &[TaskAction] {
        &self.actions
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.error_handler.as_ref()
    }

    pub fn finally(&self) -> Option<&TaskAction> {
        self.finally.as_ref()
    }

    pub fn dependencies(&self) -> &[TaskDependency] {
        &self.dependencies
    }

    pub fn dependees(&self) -> &[TaskDependency] {
        &self.dependees
    }

    /// Append a dependency edge unless one with the same name (ignoring case)
    /// is already declared. Returns whether the edge was added.
    pub(crate) fn push_dependency(&mut self, dependency: TaskDependency) -> bool {
        if self
            .dependencies
            .iter()
            .any(|d| same_task(&d.name, &dependency.name))
        {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    pub(crate) fn push_dependee(&mut self, dependee: TaskDependency) -> bool {
        if self
            .dependees
            .iter()
            .any(|d| same_task(&d.name, &dependee.name))
        {
            return false;
        }
        self.dependees.push(dependee);
        true
    }
}

/// Fluent construction of a [`Task`].
///
/// ```
/// use taskhost::dag::TaskBuilder;
///
/// let task = TaskBuilder::new("Build")
///     .description("Compile everything")
///     .is_dependent_on("Clean")
///     .does(|_ctx| Ok(()))
///     .build();
///
/// assert_eq!(task.dependencies()[0].name, "Clean");
/// ```
#[derive(Debug)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            task: Task::new(name),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    /// This task runs after `name`.
    pub fn is_dependent_on(self, name: impl Into<String>) -> Self {
        self.with_dependency(TaskDependency::required(name))
    }

    pub fn with_dependency(mut self, dependency: TaskDependency) -> Self {
        self.task.push_dependency(dependency);
        self
    }

    /// This task runs before `name`.
    pub fn is_dependee_of(self, name: impl Into<String>) -> Self {
        self.with_dependee(TaskDependency::required(name))
    }

    pub fn with_dependee(mut self, dependee: TaskDependency) -> Self {
        self.task.push_dependee(dependee);
        self
    }

    pub fn with_criteria<F>(self, predicate: F) -> Self
    where
        F: Fn(&ExecutionContext) -> bool + Send + Sync + 'static,
    {
        self.with_criterion(Criterion::new(predicate))
    }

    pub fn with_criteria_message<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&ExecutionContext) -> bool + Send + Sync + 'static,
    {
        self.with_criterion(Criterion::new(predicate).with_message(message))
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.task.criteria.push(criterion);
        self
    }

    pub fn does<F>(self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        self.with_action(TaskAction::from_fn(f))
    }

    pub fn does_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.with_action(TaskAction::from_async(f))
    }

    pub fn with_action(mut self, action: TaskAction) -> Self {
        self.task.actions.push(action);
        self
    }

    /// Install the error handler. A task has at most one; a second call
    /// replaces the first.
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: Fn(&anyhow::Error, &ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        self.with_error_handler(ErrorHandler::from_fn(f))
    }

    pub fn on_error_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(String, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.with_error_handler(ErrorHandler::from_async(f))
    }

    /// Log action errors and keep going.
    pub fn continue_on_error(self) -> Self {
        let name = self.task.name.clone();
        self.on_error(move |err, _ctx| {
            warn!(task = %name, error = %format!("{err:#}"), "continuing after task error");
            Ok(())
        })
    }

    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        if self.task.error_handler.is_some() {
            warn!(task = %self.task.name, "replacing existing error handler");
        }
        self.task.error_handler = Some(handler);
        self
    }

    pub fn finally<F>(self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<()> + Send + Sync + 'static,
    {
        self.with_finally(TaskAction::from_fn(f))
    }

    pub fn finally_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.with_finally(TaskAction::from_async(f))
    }

    pub fn with_finally(mut self, action: TaskAction) -> Self {
        self.task.finally = Some(action);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl From<TaskBuilder> for Task {
    fn from(builder: TaskBuilder) -> Self {
        builder.build()
    }
}
