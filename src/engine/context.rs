// src/engine/context.rs

//! Shared, read-mostly state handed to actions, criteria and hooks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::arguments::Arguments;

/// Everything a task body may look at during a run.
///
/// Cloning is cheap; all clones share the same state and cancellation token.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    arguments: Arguments,
    environment: BTreeMap<String, String>,
    working_directory: PathBuf,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::default()
    }

    pub fn arguments(&self) -> &Arguments {
        &self.inner.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.inner.arguments.get(name)
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.inner.arguments.has(name)
    }

    /// Environment as captured when the context was built.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.inner.environment
    }

    pub fn environment_variable(&self, name: &str) -> Option<&str> {
        self.inner.environment.get(name).map(String::as_str)
    }

    pub fn working_directory(&self) -> &Path {
        &self.inner.working_directory
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.cancellation
    }

    /// Ask the engine to stop scheduling further tasks.
    pub fn cancel(&self) {
        self.inner.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::builder().build()
    }
}

/// Builder for [`ExecutionContext`].
///
/// Unset fields default to the current process environment and working
/// directory, no arguments and a fresh cancellation token.
#[derive(Debug, Default)]
pub struct ExecutionContextBuilder {
    arguments: Option<Arguments>,
    environment: Option<BTreeMap<String, String>>,
    working_directory: Option<PathBuf>,
    cancellation: Option<CancellationToken>,
}

impl ExecutionContextBuilder {
    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = Some(environment);
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

    pub fn build(self) -> ExecutionContext {
        let working_directory = self.working_directory.unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

        ExecutionContext {
            inner: Arc::new(ContextInner {
                arguments: self.arguments.unwrap_or_default(),
                environment: self
                    .environment
                    .unwrap_or_else(|| std::env::vars().collect()),
                working_directory,
                cancellation: self.cancellation.unwrap_or_default(),
            }),
        }
    }
}
