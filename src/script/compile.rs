// src/script/compile.rs

//! Turns a validated [`ScriptFile`] into a populated [`TaskGraph`].

use tracing::{debug, warn};

use crate::dag::{Criterion, TaskBuilder, TaskDependency, TaskGraph};
use crate::engine::ExecutionContext;
use crate::errors::Result;
use crate::exec::run_shell_command;
use crate::script::model::{CriterionSpec, ScriptFile, TaskSpec};

/// Register every task of `script`, in file order, then validate the whole
/// graph (missing dependencies, dangling dependees, cycles).
pub fn compile(script: &ScriptFile) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    for spec in &script.task {
        graph.add_task(compile_task(spec))?;
    }
    graph.validate()?;
    debug!(tasks = graph.len(), "compiled script");
    Ok(graph)
}

fn compile_task(spec: &TaskSpec) -> TaskBuilder {
    let mut builder = TaskBuilder::new(&spec.name);

    if let Some(description) = &spec.description {
        builder = builder.description(description);
    }
    for name in &spec.depends_on {
        builder = builder.is_dependent_on(name);
    }
    for name in &spec.optional_depends_on {
        builder = builder.with_dependency(TaskDependency::optional(name));
    }
    for name in &spec.dependee_of {
        builder = builder.is_dependee_of(name);
    }
    for criterion in &spec.criteria {
        builder = builder.with_criterion(compile_criterion(criterion));
    }

    for command in &spec.cmd {
        let task = spec.name.clone();
        let command = command.clone();
        builder = builder.does_async(move |ctx| {
            let task = task.clone();
            let command = command.clone();
            async move { run_shell_command(&task, &command, &ctx).await }
        });
    }

    if let Some(command) = &spec.on_error {
        let task = spec.name.clone();
        let command = command.clone();
        builder = builder.on_error_async(move |message, ctx| {
            let task = task.clone();
            let command = command.clone();
            async move {
                warn!(task = %task, error = %message, "running on_error command");
                run_shell_command(&task, &command, &ctx).await
            }
        });
    } else if spec.continue_on_error {
        builder = builder.continue_on_error();
    }

    if let Some(command) = &spec.finally {
        let task = spec.name.clone();
        let command = command.clone();
        builder = builder.finally_async(move |ctx| {
            let task = task.clone();
            let command = command.clone();
            async move { run_shell_command(&task, &command, &ctx).await }
        });
    }

    builder
}

fn compile_criterion(spec: &CriterionSpec) -> Criterion {
    let message = describe(spec);
    let criterion = match spec.clone() {
        CriterionSpec::HasArgument(name) => {
            Criterion::new(move |ctx: &ExecutionContext| ctx.has_argument(&name))
        }
        CriterionSpec::ArgumentEquals { name, value } => {
            Criterion::new(move |ctx: &ExecutionContext| {
                ctx.argument(&name)
                    .is_some_and(|actual| actual.eq_ignore_ascii_case(&value))
            })
        }
        CriterionSpec::EnvSet(var) => {
            Criterion::new(move |ctx: &ExecutionContext| ctx.environment_variable(&var).is_some())
        }
        CriterionSpec::EnvNotSet(var) => {
            Criterion::new(move |ctx: &ExecutionContext| ctx.environment_variable(&var).is_none())
        }
        CriterionSpec::PathExists(path) => {
            Criterion::new(move |ctx: &ExecutionContext| ctx.working_directory().join(&path).exists())
        }
    };
    criterion.with_message(message)
}

fn describe(spec: &CriterionSpec) -> String {
    match spec {
        CriterionSpec::HasArgument(name) => format!("argument '{name}' not given"),
        CriterionSpec::ArgumentEquals { name, value } => {
            format!("argument '{name}' is not '{value}'")
        }
        CriterionSpec::EnvSet(var) => format!("environment variable '{var}' not set"),
        CriterionSpec::EnvNotSet(var) => format!("environment variable '{var}' is set"),
        CriterionSpec::PathExists(path) => format!("path '{path}' does not exist"),
    }
}
