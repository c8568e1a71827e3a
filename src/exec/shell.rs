// src/exec/shell.rs

//! Shell command runner used by script-defined task actions.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::engine::ExecutionContext;

/// Run `command` through the platform shell in the context's working
/// directory and wait for it.
///
/// stdout is inherited so task output reaches the terminal; stderr is
/// forwarded line by line at debug level. A non-zero exit status is an
/// error. If the context is cancelled while the command runs, the child is
/// killed and an error returned.
pub async fn run_shell_command(task: &str, command: &str, ctx: &ExecutionContext) -> Result<()> {
    info!(task = %task, cmd = %command, "running command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.current_dir(ctx.working_directory())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    tokio::select! {
        status = child.wait() => {
            let status = status
                .with_context(|| format!("waiting for process of task '{task}'"))?;
            let code = status.code().unwrap_or(-1);
            debug!(task = %task, exit_code = code, success = status.success(), "command exited");

            if !status.success() {
                bail!("command `{command}` exited with code {code}");
            }
            Ok(())
        }

        () = ctx.cancellation_token().cancelled() => {
            warn!(task = %task, cmd = %command, "cancellation requested; killing process");
            if let Err(e) = child.kill().await {
                warn!(task = %task, error = %e, "failed to kill child process on cancellation");
            }
            bail!("command `{command}` was cancelled")
        }
    }
}
