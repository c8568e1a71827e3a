// src/errors.rs

//! Crate-wide error types.
//!
//! Registration and resolution problems are structured variants so callers
//! (and tests) can match on them. Task bodies, hooks and handlers return
//! plain `anyhow` errors, which end up wrapped in [`TaskhostError::TaskFailed`]
//! or [`TaskhostError::Setup`].

use thiserror::Error;

use crate::report::Report;

#[derive(Error, Debug)]
pub enum TaskhostError {
    #[error("Task name cannot be empty")]
    EmptyTaskName,

    #[error("Another task with the name '{0}' has already been added")]
    DuplicateTask(String),

    #[error("The task '{0}' could not be found")]
    TaskNotFound(String),

    #[error("Task '{task}' is dependent on task '{dependency}' which does not exist")]
    MissingDependency { task: String, dependency: String },

    #[error("Task '{task}' is a dependee of task '{dependee}' which does not exist")]
    MissingDependee { task: String, dependee: String },

    #[error("Cyclic dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("Setup failed: {0:#}")]
    Setup(anyhow::Error),

    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("Run was cancelled before task '{0}'")]
    Cancelled(String),

    #[error("Script error: {0}")]
    ScriptError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A failed [`Engine::run_target`](crate::engine::Engine::run_target) call.
///
/// Carries whatever was recorded before the run stopped, so the report can
/// still be printed.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct RunError {
    pub report: Report,
    #[source]
    pub source: TaskhostError,
}

impl RunError {
    pub fn new(report: Report, source: TaskhostError) -> Self {
        Self { report, source }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskhostError>;
