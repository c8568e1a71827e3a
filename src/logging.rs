// src/logging.rs

//! `tracing-subscriber` setup for the binary.
//!
//! The filter comes from the `--log-level` flag when given, otherwise from
//! `TASKHOST_LOG`, otherwise `info`. `TASKHOST_LOG` takes either a bare
//! level (`debug`) or full filter directives (`taskhost::engine=trace`).
//!
//! Everything is written to stderr; stdout belongs to task output and the
//! run report.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TASKHOST_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => level_filter(level.into()),
        None => filter_from_env().unwrap_or_else(|| level_filter(Level::INFO)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

fn filter_from_env() -> Option<EnvFilter> {
    let raw = std::env::var(LOG_ENV_VAR).ok()?;
    match parse_level_str(&raw) {
        Some(level) => Some(level_filter(level)),
        None => EnvFilter::try_new(raw.trim()).ok(),
    }
}

/// Parse a bare level name, case-insensitively. `warning` is accepted for
/// `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("warning") {
        return Some(Level::WARN);
    }
    s.parse().ok()
}
