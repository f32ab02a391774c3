// src/exec/tokio_backend.rs

//! Executor backed by a Tokio runtime's blocking thread pool.
//!
//! Useful when the application already owns a Tokio runtime: task bodies run
//! through `spawn_blocking`, so the runtime's `max_blocking_threads` bounds
//! their parallelism.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::runtime;
use tracing::{debug, info};

use crate::errors::{FuturoError, Result};
use crate::exec::backend::Executor;
use crate::exec::handle::{Completer, Handle};
use crate::exec::task_runner::run_job;
use crate::forward::ForwardingHandle;

pub struct TokioExecutor {
    runtime: runtime::Handle,
    closed: AtomicBool,
    submitted: AtomicU64,
}

impl TokioExecutor {
    pub fn new(runtime: runtime::Handle) -> Self {
        Self {
            runtime,
            closed: AtomicBool::new(false),
            submitted: AtomicU64::new(0),
        }
    }

    /// Use the runtime the calling thread is running in.
    pub fn current() -> Result<Self> {
        let handle = runtime::Handle::try_current().map_err(|e| {
            FuturoError::Scheduling(format!("no Tokio runtime on this thread: {e}"))
        })?;
        Ok(Self::new(handle))
    }

    /// Reject further submissions. Work that is already running is unaffected.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("tokio executor closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Executor for TokioExecutor {
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        if self.is_closed() {
            return Err(FuturoError::Scheduling(
                "cannot schedule new work after the executor was closed".to_string(),
            ));
        }

        let seq = self.submitted.fetch_add(1, Ordering::Relaxed);
        let handle = Handle::pending();
        let completion = Completer::new(handle.clone());

        // Detached; the outcome travels through `handle`.
        let _join = self
            .runtime
            .spawn_blocking(move || run_job(job, completion, seq));

        // A shut-down runtime drops the closure inside `spawn_blocking`.
        if handle.failure().is_some_and(|f| f.is_dropped()) {
            return Err(FuturoError::Scheduling(
                "tokio runtime is shut down".to_string(),
            ));
        }

        debug!(seq, "job handed to tokio blocking pool");
        Ok(ForwardingHandle::new(handle))
    }
}
