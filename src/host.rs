// src/host.rs

//! High-level host bundling the engine with a context, a strategy and a
//! report printer.
//!
//! ```no_run
//! use taskhost::dag::TaskBuilder;
//! use taskhost::host::Host;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut host = Host::builder().build();
//! host.register(TaskBuilder::new("Clean").does(|_ctx| Ok(())))?;
//! host.register(TaskBuilder::new("Build").is_dependent_on("Clean"))?;
//! host.register(TaskBuilder::new("Default").is_dependent_on("Build"))?;
//! host.run().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::arguments::Arguments;
use crate::dag::{Task, TaskGraph};
use crate::engine::{
    DefaultExecutionStrategy, DryRunExecutionStrategy, Engine, ExecutionContext,
    ExecutionStrategy, RunSettings,
};
use crate::errors::{Result, RunError};
use crate::report::{ConsoleReportPrinter, Report, ReportPrinter};

/// Target used when neither the caller nor the `target` argument names one.
pub const DEFAULT_TARGET: &str = "Default";

pub struct Host {
    engine: Engine,
    context: ExecutionContext,
    strategy: Box<dyn ExecutionStrategy>,
    printer: Box<dyn ReportPrinter>,
    default_target: Option<String>,
    exclusive: bool,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("engine", &self.engine)
            .field("context", &self.context)
            .field("exclusive", &self.exclusive)
            .finish_non_exhaustive()
    }
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn register(&mut self, task: impl Into<Task>) -> Result<()> {
        self.engine.register_task(task)
    }

    pub fn setup<F>(&mut self, f: F)
    where
        F: Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.engine.register_setup(f);
    }

    pub fn teardown<F>(&mut self, f: F)
    where
        F: Fn(&ExecutionContext, &Report) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.engine.register_teardown(f);
    }

    /// `target` argument, then the configured default, then [`DEFAULT_TARGET`].
    pub fn default_target(&self) -> String {
        self.context
            .argument("target")
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_target.clone())
            .unwrap_or_else(|| DEFAULT_TARGET.to_string())
    }

    pub async fn run(&self) -> std::result::Result<Report, RunError> {
        let target = self.default_target();
        self.run_target(&target).await
    }

    /// Run `target` and hand the report to the printer, whatever the outcome.
    pub async fn run_target(&self, target: &str) -> std::result::Result<Report, RunError> {
        let settings = RunSettings::new(target).exclusive(self.exclusive);
        let result = self
            .engine
            .run_target(&self.context, self.strategy.as_ref(), &settings)
            .await;

        let report = match &result {
            Ok(report) => report,
            Err(err) => &err.report,
        };
        if !report.is_empty() {
            if let Err(err) = self.printer.write(report) {
                warn!(error = %err, "failed to print report");
            }
        }

        result
    }
}

#[derive(Default)]
pub struct HostBuilder {
    graph: Option<TaskGraph>,
    arguments: Option<Arguments>,
    working_directory: Option<PathBuf>,
    cancellation: Option<CancellationToken>,
    strategy: Option<Box<dyn ExecutionStrategy>>,
    printer: Option<Box<dyn ReportPrinter>>,
    default_target: Option<String>,
    dry_run: bool,
    exclusive: bool,
}

impl HostBuilder {
    /// Start from an already populated graph (e.g. a compiled script).
    pub fn graph(mut self, graph: TaskGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Use the dry-run strategy. Ignored if an explicit strategy is set.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn strategy(mut self, strategy: impl ExecutionStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    pub fn printer(mut self, printer: impl ReportPrinter + 'static) -> Self {
        self.printer = Some(Box::new(printer));
        self
    }

    pub fn default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn build(self) -> Host {
        let mut context = ExecutionContext::builder();
        if let Some(arguments) = self.arguments {
            context = context.arguments(arguments);
        }
        if let Some(dir) = self.working_directory {
            context = context.working_directory(dir);
        }
        if let Some(token) = self.cancellation {
            context = context.cancellation_token(token);
        }

        let strategy = match self.strategy {
            Some(strategy) => strategy,
            None if self.dry_run => Box::new(DryRunExecutionStrategy::new()),
            None => Box::new(DefaultExecutionStrategy::new()),
        };

        Host {
            engine: Engine::new(self.graph.unwrap_or_default()),
            context: context.build(),
            strategy,
            printer: self
                .printer
                .unwrap_or_else(|| Box::new(ConsoleReportPrinter)),
            default_target: self.default_target,
            exclusive: self.exclusive,
        }
    }
}
