// src/lib.rs

//! taskhost: a build-automation host.
//!
//! A build script registers tasks into a [`TaskGraph`](dag::TaskGraph); the
//! [`Engine`](engine::Engine) resolves the order for a target and runs the
//! tasks one at a time through an
//! [`ExecutionStrategy`](engine::ExecutionStrategy), producing a
//! [`Report`](report::Report).

pub mod arguments;
pub mod cli;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod report;
pub mod script;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::arguments::Arguments;
use crate::cli::CliArgs;
use crate::dag::TaskGraph;
use crate::host::Host;
use crate::script::{load_graph, script_root_dir};

/// Load the script named on the command line and run the requested target.
///
/// With `--list` the tasks are printed instead. Ctrl-C cancels the run
/// between tasks (and kills a running shell command). Fails when the script
/// is invalid or any task failed.
pub async fn run(args: CliArgs) -> Result<()> {
    let script_path = PathBuf::from(&args.script);
    let (script, graph) = load_graph(&script_path)?;

    if args.list {
        print_task_list(&graph);
        return Ok(());
    }

    let arguments = Arguments::parse(&args.script_args);
    debug!(?arguments, "parsed script arguments");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "could not listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling run");
            cancel.cancel();
        });
    }

    let mut builder = Host::builder()
        .graph(graph)
        .arguments(arguments)
        .working_directory(script_root_dir(&script_path))
        .cancellation_token(cancel)
        .dry_run(args.dry_run)
        .exclusive(args.exclusive);
    if let Some(target) = script.default_target {
        builder = builder.default_target(target);
    }
    let host = builder.build();

    match args.target {
        Some(target) => host.run_target(&target).await?,
        None => host.run().await?,
    };

    Ok(())
}

/// Print tasks with their descriptions and dependencies.
fn print_task_list(graph: &TaskGraph) {
    println!("tasks ({}):", graph.len());
    for task in graph.tasks() {
        match task.description() {
            Some(description) => println!("  - {}: {}", task.name(), description),
            None => println!("  - {}", task.name()),
        }
        if !task.dependencies().is_empty() {
            let deps: Vec<&str> = task
                .dependencies()
                .iter()
                .map(|d| d.name.as_str())
                .collect();
            println!("      depends on: {}", deps.join(", "));
        }
    }
}
