// src/dag/upstream.rs

//! Read access to a task's dependencies from inside its body.

use crate::dag::task_info::TaskId;
use crate::errors::{FuturoError, Result};
use crate::forward::ForwardingHandle;

/// Handles of a task's direct dependencies, in declaration order.
///
/// Every handle is terminal by the time the body runs, so reading from it
/// never blocks. Under [`FailurePolicy::ProceedRegardless`](crate::types::FailurePolicy)
/// a failed dependency shows up here as an `Err` from [`Upstream::value`].
pub struct Upstream<T> {
    entries: Vec<(TaskId, ForwardingHandle<T>)>,
}

impl<T> Upstream<T> {
    pub(crate) fn new(entries: Vec<(TaskId, ForwardingHandle<T>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the `i`-th dependency.
    pub fn value(&self, i: usize) -> Result<&T> {
        self.handle(i)?.get()
    }

    /// Handle of the `i`-th dependency.
    pub fn handle(&self, i: usize) -> Result<&ForwardingHandle<T>> {
        self.entries.get(i).map(|(_, h)| h).ok_or_else(|| {
            FuturoError::Resolution(format!(
                "dependency index {i} out of range ({} dependencies)",
                self.entries.len()
            ))
        })
    }

    /// Handle of the dependency registered as `task`.
    pub fn of(&self, task: TaskId) -> Result<&ForwardingHandle<T>> {
        self.entries
            .iter()
            .find(|(id, _)| *id == task)
            .map(|(_, h)| h)
            .ok_or_else(|| FuturoError::Resolution(format!("{task} is not a dependency")))
    }

    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &ForwardingHandle<T>)> {
        self.entries.iter().map(|(id, h)| (*id, h))
    }

    /// Values of every dependency, failing on the first one that did not resolve.
    pub fn values(&self) -> Result<Vec<&T>> {
        self.entries.iter().map(|(_, h)| h.get()).collect()
    }
}
