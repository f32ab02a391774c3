// src/exec/pool.rs

//! Bounded worker-thread pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::PoolSection;
use crate::config::validate::validate_pool;
use crate::errors::{FuturoError, Result};
use crate::exec::backend::Executor;
use crate::exec::handle::{Completer, Handle};
use crate::exec::task_runner::run_job;
use crate::forward::ForwardingHandle;

type Work = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of OS threads pulling work from a shared queue.
///
/// - Submissions never block; excess work waits in the queue.
/// - [`shutdown`](WorkerPool::shutdown) closes the queue. Workers finish
///   everything already queued and then exit.
/// - Dropping the pool shuts it down and joins the workers.
pub struct WorkerPool {
    queue: Mutex<Option<Sender<Work>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
    submitted: AtomicU64,
}

impl WorkerPool {
    /// Spawn `workers` threads named `futuro-worker-<n>`.
    pub fn new(workers: usize) -> Result<Self> {
        Self::with_thread_name(workers, "futuro-worker")
    }

    /// Build a pool from the `[pool]` config section.
    pub fn from_config(cfg: &PoolSection) -> Result<Self> {
        validate_pool(cfg)?;
        Self::with_thread_name(cfg.workers, &cfg.thread_name)
    }

    pub fn with_thread_name(workers: usize, thread_name: &str) -> Result<Self> {
        if workers == 0 {
            return Err(FuturoError::ConfigError(
                "worker pool needs at least one worker (got 0)".to_string(),
            ));
        }

        let (tx, rx) = crossbeam_channel::unbounded::<Work>();

        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("{thread_name}-{index}"))
                .spawn(move || worker_loop(rx))?;
            handles.push(handle);
        }

        info!(workers, thread_name, "worker pool started");

        Ok(Self {
            queue: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
            size: workers,
            submitted: AtomicU64::new(0),
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of jobs accepted so far.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue.lock().is_none()
    }

    /// Stop accepting work.
    ///
    /// Already queued jobs still run. With `wait = true` this blocks until
    /// every worker has drained the queue and exited. Must not be called with
    /// `wait = true` from inside a job running on this pool.
    pub fn shutdown(&self, wait: bool) {
        if self.queue.lock().take().is_some() {
            info!(wait, "worker pool shutting down");
        }

        if wait {
            let handles: Vec<_> = self.workers.lock().drain(..).collect();
            for handle in handles {
                let _ = handle.join();
            }
        }
    }
}

impl Executor for WorkerPool {
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let queue = self.queue.lock();
        let tx = queue.as_ref().ok_or_else(|| {
            FuturoError::Scheduling("cannot schedule new work after shutdown".to_string())
        })?;

        let seq = self.submitted.fetch_add(1, Ordering::Relaxed);
        let handle = Handle::pending();
        let completion = Completer::new(handle.clone());

        tx.send(Box::new(move || run_job(job, completion, seq)))
            .map_err(|_| FuturoError::Scheduling("worker queue is closed".to_string()))?;

        debug!(seq, "job queued");
        Ok(ForwardingHandle::new(handle))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(true);
    }
}

fn worker_loop(rx: Receiver<Work>) {
    debug!("worker started");
    while let Ok(work) = rx.recv() {
        work();
    }
    debug!("worker finished (queue closed)");
}
