// src/dag/report.rs

//! Outcome of a completed scheduler run.

use std::collections::HashMap;

use crate::dag::task_info::{TaskId, TaskRunState};
use crate::errors::{FuturoError, Result};
use crate::forward::ForwardingHandle;

/// Index-addressed mapping from every registered task to its terminal handle.
pub struct RunReport<T> {
    entries: Vec<ReportEntry<T>>,
    submission_order: Vec<TaskId>,
}

struct ReportEntry<T> {
    id: TaskId,
    label: Option<String>,
    state: TaskRunState,
    handle: ForwardingHandle<T>,
}

impl<T> RunReport<T> {
    pub(crate) fn new(submission_order: Vec<TaskId>) -> Self {
        Self {
            entries: Vec::new(),
            submission_order,
        }
    }

    pub(crate) fn push(
        &mut self,
        id: TaskId,
        label: Option<String>,
        state: TaskRunState,
        handle: ForwardingHandle<T>,
    ) {
        self.entries.push(ReportEntry {
            id,
            label,
            state,
            handle,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: TaskId) -> Option<&ReportEntry<T>> {
        self.entries
            .get(id.index())
            .filter(|entry| entry.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&ForwardingHandle<T>> {
        self.entry(id).map(|entry| &entry.handle)
    }

    /// Resolved value of `id`. Never blocks: every handle in a report is terminal.
    pub fn value(&self, id: TaskId) -> Result<&T> {
        self.get(id)
            .ok_or(FuturoError::UnknownTask(id))?
            .get()
    }

    pub fn label(&self, id: TaskId) -> Option<&str> {
        self.entry(id).and_then(|entry| entry.label.as_deref())
    }

    pub fn state_of(&self, id: TaskId) -> Option<TaskRunState> {
        self.entry(id).map(|entry| entry.state)
    }

    /// Tasks in the order they were handed to the executor.
    pub fn submission_order(&self) -> &[TaskId] {
        &self.submission_order
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &ForwardingHandle<T>)> {
        self.entries.iter().map(|entry| (entry.id, &entry.handle))
    }

    pub fn succeeded(&self) -> Vec<TaskId> {
        self.with_state(TaskRunState::Succeeded)
    }

    pub fn failed(&self) -> Vec<TaskId> {
        self.with_state(TaskRunState::Failed)
    }

    pub fn skipped(&self) -> Vec<TaskId> {
        self.with_state(TaskRunState::Skipped)
    }

    /// Whether every task succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.state == TaskRunState::Succeeded)
    }

    fn with_state(&self, state: TaskRunState) -> Vec<TaskId> {
        self.entries
            .iter()
            .filter(|entry| entry.state == state)
            .map(|entry| entry.id)
            .collect()
    }

    pub fn into_map(self) -> HashMap<TaskId, ForwardingHandle<T>> {
        self.entries
            .into_iter()
            .map(|entry| (entry.id, entry.handle))
            .collect()
    }
}
