// src/report/printer.rs

use std::io::{self, Write};
use std::time::Duration;

use super::{Report, TaskOutcome};

/// Consumer of a finished [`Report`].
pub trait ReportPrinter: Send + Sync {
    fn write(&self, report: &Report) -> io::Result<()>;
}

/// Prints the report as a plain table on stdout.
///
/// Task output also goes to stdout, logs go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReportPrinter;

impl ReportPrinter for ConsoleReportPrinter {
    fn write(&self, report: &Report) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(render(report).as_bytes())?;
        out.flush()
    }
}

/// Render the report table.
pub fn render(report: &Report) -> String {
    let width = report
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("Task".len()))
        .max()
        .unwrap_or(4)
        + 2;

    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("{:<width$}{:<16}{}\n", "Task", "Duration", "Status"));
    out.push_str(&"-".repeat(width + 16 + 10));
    out.push('\n');

    for result in report {
        let duration = match result.outcome {
            TaskOutcome::Skipped => "-".to_string(),
            _ => format_duration(result.duration),
        };
        out.push_str(&format!(
            "{:<width$}{:<16}{}\n",
            result.name, duration, result.outcome
        ));
    }

    out.push_str(&"-".repeat(width + 16 + 10));
    out.push('\n');
    out.push_str(&format!(
        "{:<width$}{}\n",
        "Total:",
        format_duration(report.total_duration())
    ));
    out
}

/// `HH:MM:SS.mmm`
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{hours:02}:{mins:02}:{secs:02}.{ms:03}")
}
