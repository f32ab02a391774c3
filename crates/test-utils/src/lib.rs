pub mod builders;
pub mod fake_executor;

use std::sync::Once;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use fake_executor::{InlineExecutor, RecordingExecutor, SubmissionRecord};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run `f` on a separate thread and panic if it does not finish within
/// 5 seconds. Keeps a deadlocked scheduler from hanging the test suite.
pub fn with_timeout<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    with_timeout_of(Duration::from_secs(5), f)
}

pub fn with_timeout_of<F, T>(limit: Duration, f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(limit)
        .unwrap_or_else(|_| panic!("Test timed out after {limit:?}"))
}
