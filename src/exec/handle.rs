// src/exec/handle.rs

//! Shared terminal-state slot behind every submission.
//!
//! A [`Handle`] starts `Pending` and moves exactly once to `Resolved`,
//! `Failed` or `Skipped`. Readers block on a condition variable; the
//! scheduler's "wait for any" primitive subscribes a [`Waiter`] that is
//! signalled when the slot becomes terminal.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::dag::TaskId;
use crate::errors::{FuturoError, Result, TaskFailure};

/// Public, payload-free view of a handle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    Pending,
    Resolved,
    Failed,
    Skipped,
}

impl HandleStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, HandleStatus::Pending)
    }
}

enum State<T> {
    Pending,
    Resolved(Arc<T>),
    Failed(TaskFailure),
    Skipped { task: TaskId, cause: TaskId },
}

struct Slot<T> {
    state: State<T>,
    waiters: Vec<(u64, Sender<()>)>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    done: Condvar,
}

/// Handle to the eventual outcome of one submitted unit of work.
pub struct Handle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Handle<T> {
    fn with_state(state: State<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state,
                    waiters: Vec::new(),
                }),
                done: Condvar::new(),
            }),
        }
    }

    /// A handle that an executor will complete later.
    pub fn pending() -> Self {
        Self::with_state(State::Pending)
    }

    /// An already-terminal handle for a task that was never submitted
    /// because `cause` failed upstream.
    pub fn skipped(task: TaskId, cause: TaskId) -> Self {
        Self::with_state(State::Skipped { task, cause })
    }

    /// Store the outcome and wake every reader and subscribed waiter.
    ///
    /// Terminal states never change; a second completion is ignored.
    pub fn complete(&self, outcome: std::result::Result<T, TaskFailure>) {
        let mut slot = self.shared.slot.lock();
        if !matches!(slot.state, State::Pending) {
            trace!("ignoring completion of an already terminal handle");
            return;
        }

        slot.state = match outcome {
            Ok(value) => State::Resolved(Arc::new(value)),
            Err(failure) => State::Failed(failure),
        };

        for (_, waiter) in slot.waiters.drain(..) {
            let _ = waiter.try_send(());
        }
        drop(slot);

        self.shared.done.notify_all();
    }

    pub fn status(&self) -> HandleStatus {
        match self.shared.slot.lock().state {
            State::Pending => HandleStatus::Pending,
            State::Resolved(_) => HandleStatus::Resolved,
            State::Failed(_) => HandleStatus::Failed,
            State::Skipped { .. } => HandleStatus::Skipped,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Block until the handle is terminal.
    ///
    /// Returns `false` if `timeout` elapsed first; the handle's eventual state
    /// is unaffected. A timeout too large to form a deadline waits forever.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut slot = self.shared.slot.lock();

        while matches!(slot.state, State::Pending) {
            match deadline {
                Some(deadline) => {
                    if self.shared.done.wait_until(&mut slot, deadline).timed_out() {
                        return !matches!(slot.state, State::Pending);
                    }
                }
                None => self.shared.done.wait(&mut slot),
            }
        }

        true
    }

    /// Block until terminal and return the shared value.
    ///
    /// Failures are re-raised as [`FuturoError::Task`], skipped tasks as
    /// [`FuturoError::Skipped`].
    pub fn outcome(&self, timeout: Option<Duration>) -> Result<Arc<T>> {
        if !self.wait(timeout) {
            return Err(FuturoError::Timeout(timeout.unwrap_or_default()));
        }

        match &self.shared.slot.lock().state {
            State::Resolved(value) => Ok(Arc::clone(value)),
            State::Failed(failure) => Err(FuturoError::Task(failure.clone())),
            State::Skipped { task, cause } => Err(FuturoError::Skipped {
                task: *task,
                failed_dependency: *cause,
            }),
            State::Pending => Err(FuturoError::Resolution(
                "handle still pending after wait".to_string(),
            )),
        }
    }

    /// Block until terminal and return a clone of the value.
    pub fn result(&self, timeout: Option<Duration>) -> Result<T>
    where
        T: Clone,
    {
        self.outcome(timeout).map(|value| (*value).clone())
    }

    /// The captured failure, if the handle is `Failed`.
    pub fn failure(&self) -> Option<TaskFailure> {
        match &self.shared.slot.lock().state {
            State::Failed(failure) => Some(failure.clone()),
            _ => None,
        }
    }

    /// The task whose failure caused this handle to be skipped.
    pub fn skip_cause(&self) -> Option<TaskId> {
        match &self.shared.slot.lock().state {
            State::Skipped { cause, .. } => Some(*cause),
            _ => None,
        }
    }

    /// Whether both handles refer to the same slot.
    pub fn same_handle(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn add_waiter(&self, waiter: &Waiter) {
        let mut slot = self.shared.slot.lock();
        if matches!(slot.state, State::Pending) {
            slot.waiters.push((waiter.id, waiter.tx.clone()));
        } else {
            let _ = waiter.tx.try_send(());
        }
    }

    fn remove_waiter(&self, waiter: &Waiter) {
        self.shared
            .slot
            .lock()
            .waiters
            .retain(|(id, _)| *id != waiter.id);
    }
}

/// Worker-side half of a pending [`Handle`].
///
/// Executors move a `Completer` into the job they queue. If the job is
/// dropped without running, the handle fails with [`TaskFailure::Dropped`]
/// instead of staying `Pending` forever.
pub struct Completer<T> {
    handle: Option<Handle<T>>,
}

impl<T> Completer<T> {
    pub fn new(handle: Handle<T>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn complete(mut self, outcome: std::result::Result<T, TaskFailure>) {
        if let Some(handle) = self.handle.take() {
            handle.complete(outcome);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("job dropped before running");
            handle.complete(Err(TaskFailure::Dropped));
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("status", &self.status())
            .finish()
    }
}

static NEXT_WAITER: AtomicU64 = AtomicU64::new(0);

/// One-shot wake-up registration shared across a set of handles.
pub struct Waiter {
    id: u64,
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Waiter {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            id: NEXT_WAITER.fetch_add(1, Ordering::Relaxed),
            tx,
            rx,
        }
    }

    fn block(&self) {
        // Our own sender keeps the channel open, so this only returns on a signal.
        let _ = self.rx.recv();
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything backed by a [`Handle`] that can take part in [`wait_any`].
pub trait Completion {
    fn is_terminal(&self) -> bool;
    fn subscribe(&self, waiter: &Waiter);
    fn unsubscribe(&self, waiter: &Waiter);
}

impl<T> Completion for Handle<T> {
    fn is_terminal(&self) -> bool {
        Handle::is_terminal(self)
    }

    fn subscribe(&self, waiter: &Waiter) {
        self.add_waiter(waiter)
    }

    fn unsubscribe(&self, waiter: &Waiter) {
        self.remove_waiter(waiter)
    }
}

/// Block until at least one item is terminal, then partition the input into
/// `(done, pending)`.
///
/// An empty input returns immediately with two empty sets.
pub fn wait_any<C: Completion>(items: Vec<C>) -> (Vec<C>, Vec<C>) {
    if items.is_empty() {
        return (Vec::new(), Vec::new());
    }

    if !items.iter().any(Completion::is_terminal) {
        let waiter = Waiter::new();
        for item in &items {
            item.subscribe(&waiter);
        }

        waiter.block();

        for item in &items {
            item.unsubscribe(&waiter);
        }
    }

    items.into_iter().partition(Completion::is_terminal)
}

/// Block until every item is terminal.
pub fn wait_all<C: Completion>(mut items: Vec<C>) {
    while !items.is_empty() {
        let (_done, pending) = wait_any(items);
        items = pending;
    }
}
