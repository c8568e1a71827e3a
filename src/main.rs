// src/main.rs

use std::process::ExitCode;

use taskhost::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("taskhost: {err:#}");
        return ExitCode::FAILURE;
    }

    match taskhost::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
