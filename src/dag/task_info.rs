// src/dag/task_info.rs

//! Task identity and per-run bookkeeping.

use std::fmt;

/// Opaque identifier of a registered task.
///
/// Ids are handed out by [`DependencyScheduler`](crate::dag::DependencyScheduler)
/// at registration and are only meaningful to the scheduler that issued
/// them: an id from another scheduler is rejected as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    scope: u64,
    index: usize,
}

impl TaskId {
    pub(crate) fn new(scope: u64, index: usize) -> Self {
        Self { scope, index }
    }

    /// Registration index within the owning scheduler (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn scope(&self) -> u64 {
        self.scope
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.index)
    }
}

/// Per-run state of a task (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    /// Waiting on at least one dependency.
    Waiting,
    /// Submitted to the executor.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Never submitted because the given upstream task failed.
    Skipped(TaskId),
}

impl RunState {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::DoneSuccess | RunState::DoneFailed | RunState::Skipped(_)
        )
    }
}

/// Public, read-only view of a task's per-run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    Waiting,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl TaskRunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunState::Succeeded | TaskRunState::Failed | TaskRunState::Skipped
        )
    }
}

impl From<RunState> for TaskRunState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Waiting => TaskRunState::Waiting,
            RunState::Running => TaskRunState::Running,
            RunState::DoneSuccess => TaskRunState::Succeeded,
            RunState::DoneFailed => TaskRunState::Failed,
            RunState::Skipped(_) => TaskRunState::Skipped,
        }
    }
}

/// Bookkeeping record for one task during a run.
#[derive(Debug, Clone)]
pub(crate) struct TaskNode {
    /// Dependencies that have not reached a terminal state yet.
    pub remaining: usize,
    pub run_state: RunState,
}

impl TaskNode {
    pub(crate) fn new(dependency_count: usize) -> Self {
        Self {
            remaining: dependency_count,
            run_state: RunState::Waiting,
        }
    }
}
