// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The scheduler talks to an `Executor` instead of a concrete pool. This
//! makes it easy to swap in a recording or inline executor in tests while
//! keeping the production implementations in [`pool`](super::pool) and
//! [`tokio_backend`](super::tokio_backend).

use crate::errors::Result;
use crate::exec::handle::{self, Completion};
use crate::forward::ForwardingHandle;

/// Trait abstracting how units of work are executed.
///
/// Contract:
/// - `submit` never blocks on the work itself. It returns a pending
///   [`ForwardingHandle`] that the executor completes once the body has run.
/// - `submit` fails with [`FuturoError::Scheduling`](crate::errors::FuturoError::Scheduling)
///   once the executor has been shut down.
/// - A body's `Err` or panic is captured in its handle; it never takes down
///   the executor.
pub trait Executor {
    /// Schedule `job` for execution and return its handle immediately.
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static;

    /// Block until at least one item is terminal and partition the set into
    /// `(done, pending)`.
    fn wait_any<C: Completion>(&self, items: Vec<C>) -> (Vec<C>, Vec<C>) {
        handle::wait_any(items)
    }
}

impl<E: Executor> Executor for &E {
    fn submit<T, F>(&self, job: F) -> Result<ForwardingHandle<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        (**self).submit(job)
    }

    fn wait_any<C: Completion>(&self, items: Vec<C>) -> (Vec<C>, Vec<C>) {
        (**self).wait_any(items)
    }
}
