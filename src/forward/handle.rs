// src/forward/handle.rs

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::trace;

use crate::dag::TaskId;
use crate::errors::{Result, TaskFailure};
use crate::exec::handle::{Completion, Handle, HandleStatus, Waiter};

/// Placeholder for a value that is still being computed.
///
/// Every accessor is potentially blocking: it waits until the underlying
/// [`Handle`] is terminal, caches the value on first success, and serves
/// later calls from the cache without touching the handle again.
///
/// Existing bindings are never rewritten in place. Callers keep the handle
/// and go through [`ForwardingHandle::get`] (or one of the forwarding
/// operations) whenever they need the value.
pub struct ForwardingHandle<T> {
    handle: Handle<T>,
    cached: OnceLock<Arc<T>>,
}

impl<T> ForwardingHandle<T> {
    pub fn new(handle: Handle<T>) -> Self {
        Self {
            handle,
            cached: OnceLock::new(),
        }
    }

    /// A terminal handle for a task skipped because `cause` failed.
    pub fn skipped(task: TaskId, cause: TaskId) -> Self {
        Self::new(Handle::skipped(task, cause))
    }

    /// The wrapped executor handle.
    pub fn handle(&self) -> &Handle<T> {
        &self.handle
    }

    pub fn status(&self) -> HandleStatus {
        if self.cached.get().is_some() {
            return HandleStatus::Resolved;
        }
        self.handle.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether a value is already cached; `true` means no accessor will block.
    pub fn is_resolved(&self) -> bool {
        self.status() == HandleStatus::Resolved
    }

    pub fn failure(&self) -> Option<TaskFailure> {
        self.handle.failure()
    }

    /// Blocks until the value is available and returns a reference to it.
    pub fn get(&self) -> Result<&T> {
        self.fetch(None)
    }

    /// Like [`get`](Self::get) but gives up after `timeout` with
    /// [`FuturoError::Timeout`](crate::errors::FuturoError::Timeout). A later
    /// call may still succeed.
    pub fn get_timeout(&self, timeout: Duration) -> Result<&T> {
        self.fetch(Some(timeout))
    }

    /// Blocks until the value is available and returns a clone of it.
    pub fn resolve(&self) -> Result<T>
    where
        T: Clone,
    {
        self.get().cloned()
    }

    pub fn resolve_timeout(&self, timeout: Duration) -> Result<T>
    where
        T: Clone,
    {
        self.get_timeout(timeout).cloned()
    }

    fn fetch(&self, timeout: Option<Duration>) -> Result<&T> {
        if let Some(value) = self.cached.get() {
            return Ok(value.as_ref());
        }

        let value = self.handle.outcome(timeout)?;
        trace!("forwarding handle resolved; caching value");
        Ok(self.cached.get_or_init(|| value).as_ref())
    }
}

impl<T> Clone for ForwardingHandle<T> {
    fn clone(&self) -> Self {
        let cached = OnceLock::new();
        if let Some(value) = self.cached.get() {
            let _ = cached.set(Arc::clone(value));
        }
        Self {
            handle: self.handle.clone(),
            cached,
        }
    }
}

impl<T> From<Handle<T>> for ForwardingHandle<T> {
    fn from(handle: Handle<T>) -> Self {
        Self::new(handle)
    }
}

impl<T> Completion for ForwardingHandle<T> {
    fn is_terminal(&self) -> bool {
        ForwardingHandle::is_terminal(self)
    }

    fn subscribe(&self, waiter: &Waiter) {
        Completion::subscribe(&self.handle, waiter)
    }

    fn unsubscribe(&self, waiter: &Waiter) {
        Completion::unsubscribe(&self.handle, waiter)
    }
}

/// Never blocks: a handle without a cached or terminal value prints `<pending>`.
impl<T: fmt::Display> fmt::Display for ForwardingHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_terminal() {
            return f.write_str("<pending>");
        }
        match self.get() {
            Ok(value) => fmt::Display::fmt(value, f),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ForwardingHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("ForwardingHandle");
        dbg.field("status", &self.status());
        if let Some(value) = self.cached.get() {
            dbg.field("value", value);
        }
        dbg.finish()
    }
}
