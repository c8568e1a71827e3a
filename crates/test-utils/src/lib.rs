//! Shared fixtures for the `taskhost` integration tests.

pub mod builders;
pub mod recording_strategy;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for a single engine run inside a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route `tracing` output through the test harness, so it only shows up for
/// failing tests (or with `--nocapture`).
///
/// The filter is read from `TASKHOST_LOG`, defaulting to `warn`. Calling this
/// more than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKHOST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("run did not finish within {TEST_TIMEOUT:?}"),
    }
}
