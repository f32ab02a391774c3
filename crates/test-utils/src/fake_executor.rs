use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futuro::errors::{FuturoError, Result};
use futuro::exec::task_runner::run_job;
use futuro::exec::{Completer, Executor, Handle};
use futuro::forward::ForwardingHandle;
use futuro::TaskId;
use parking_lot::Mutex;

/// Timestamps of one submission, in submission order.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRecord {
    pub seq: usize,
    pub submitted_at: Instant,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SubmissionRecord {
    /// Whether the two bodies ran at overlapping times.
    pub fn overlaps(&self, other: &SubmissionRecord) -> bool {
        match (
            self.started_at,
            self.finished_at,
            other.started_at,
            other.finished_at,
        ) {
            (Some(s1), Some(f1), Some(s2), Some(f2)) => s1 < f2 && s2 < f1,
            _ => false,
        }
    }
}

/// Wraps another executor and records when each job was submitted, started
/// and finished.
///
/// The scheduler submits one task at a time, so record `i` belongs to
/// `report.submission_order()[i]`; [`RecordingExecutor::record_for`] does
/// that lookup.
pub struct RecordingExecutor<E> {
    inner: E,
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl<E: Executor> RecordingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records.lock().clone()
    }

    pub fn submissions(&self) -> usize {
        self.records.lock().len()
    }

    /// Record of `task`, given the run's submission order.
    pub fn record_for(&self, order: &[TaskId], task: TaskId) -> Option<SubmissionRecord> {
        let seq = order.iter().position(|id| *id == task)?;
        self.records.lock().get(seq).copied()
    }
}

impl<E: Executor> Executor for RecordingExecutor<E> {
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let seq = {
            let mut records = self.records.lock();
            let seq = records.len();
            records.push(SubmissionRecord {
                seq,
                submitted_at: Instant::now(),
                started_at: None,
                finished_at: None,
            });
            seq
        };

        let records = Arc::clone(&self.records);
        let result = self.inner.submit(move || {
            if let Some(rec) = records.lock().get_mut(seq) {
                rec.started_at = Some(Instant::now());
            }
            let out = job();
            if let Some(rec) = records.lock().get_mut(seq) {
                rec.finished_at = Some(Instant::now());
            }
            out
        });

        if result.is_err() {
            self.records.lock().truncate(seq);
        }
        result
    }
}

/// Runs every job synchronously inside `submit`.
///
/// Deterministic: the handle is already terminal when `submit` returns.
/// `reject_after(n)` accepts `n` submissions and then behaves like an
/// executor that has been shut down.
#[derive(Default)]
pub struct InlineExecutor {
    accepted: AtomicU64,
    limit: Option<u64>,
}

impl InlineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_after(limit: u64) -> Self {
        Self {
            accepted: AtomicU64::new(0),
            limit: Some(limit),
        }
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Executor for InlineExecutor {
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let seq = self.accepted.load(Ordering::SeqCst);
        if self.limit.is_some_and(|limit| seq >= limit) {
            return Err(FuturoError::Scheduling(
                "inline executor is shut down".to_string(),
            ));
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);

        let handle = Handle::pending();
        run_job(job, Completer::new(handle.clone()), seq);
        Ok(ForwardingHandle::new(handle))
    }
}
