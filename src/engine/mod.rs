// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the [`ExecutionContext`] shared by every task of a run
//! - the [`ExecutionStrategy`] seam (default and dry-run variants)
//! - the [`Engine`] that resolves a target and drives each task in order,
//!   accumulating a [`Report`](crate::report::Report)

use std::sync::Arc;

use crate::report::Report;

/// Run-level setup hook, invoked once before the first task.
pub type SetupHook = Arc<dyn Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync>;

/// Run-level teardown hook, invoked once after the last attempted task with
/// the report so far.
pub type TeardownHook =
    Arc<dyn Fn(&ExecutionContext, &Report) -> anyhow::Result<()> + Send + Sync>;

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub target: String,
    /// Run only the target, without its dependencies.
    pub exclusive: bool,
}

impl RunSettings {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            exclusive: false,
        }
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }
}

pub mod context;
pub mod runner;
pub mod strategy;

pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use runner::Engine;
pub use strategy::{DefaultExecutionStrategy, DryRunExecutionStrategy, ExecutionStrategy};
