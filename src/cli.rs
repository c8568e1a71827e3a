// src/cli.rs

use clap::{Parser, ValueEnum};

use crate::script::DEFAULT_SCRIPT;

/// `taskhost [OPTIONS] [-- SCRIPT_ARGS...]`
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskhost",
    version,
    about = "Run build tasks in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Build script to load.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SCRIPT)]
    pub script: String,

    /// Task to run. Falls back to the `--target` script argument, then the
    /// script's `default_target`, then `Default`.
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Skip the target's dependencies.
    #[arg(long)]
    pub exclusive: bool,

    /// Evaluate criteria and report what would run; execute nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// List the script's tasks and exit.
    #[arg(long)]
    pub list: bool,

    /// Overrides `TASKHOST_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Handed to the script, e.g. `-- --configuration=Release --rebuild`.
    #[arg(last = true, value_name = "SCRIPT_ARGS")]
    pub script_args: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
