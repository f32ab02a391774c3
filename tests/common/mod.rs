#![allow(dead_code)]

use std::time::Duration;

use futuro::WorkerPool;

pub use futuro_test_utils::builders;
pub use futuro_test_utils::{InlineExecutor, RecordingExecutor, init_tracing, with_timeout};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A worker pool for tests; panics if the pool cannot be built.
pub fn pool(workers: usize) -> WorkerPool {
    WorkerPool::new(workers).expect("failed to start worker pool")
}
