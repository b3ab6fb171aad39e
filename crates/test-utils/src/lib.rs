//! Shared helpers for `ecobuild` integration tests.

pub mod builders;
pub mod fake_fetcher;
pub mod shared_buffer;

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single async test. Process tests sleep on purpose;
/// this only catches hangs.
pub const TEST_DEADLINE: Duration = Duration::from_secs(30);

static TRACING: OnceLock<()> = OnceLock::new();

/// Route `tracing` output through the test harness's captured writer.
///
/// Filter with `RUST_LOG`; defaults to `ecobuild=debug`. Output only shows up
/// for failing tests unless `--nocapture` is passed.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ecobuild=debug"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("test did not finish within {TEST_DEADLINE:?}"),
    }
}
