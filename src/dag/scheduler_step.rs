// src/dag/scheduler_step.rs

//! Result type for a single readiness update.

use crate::dag::task_info::TaskId;

/// A task that will never be submitted because an upstream task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedTask {
    pub task: TaskId,
    /// The failed task at the root of the skip chain.
    pub failed_dependency: TaskId,
}

/// What changed after one task reached a terminal state.
///
/// Returned by [`StateManager::complete`](crate::dag::state_manager::StateManager::complete)
/// so tests can step the graph by hand without any threads.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks whose last outstanding dependency just finished; submit them now.
    pub newly_ready: Vec<TaskId>,
    /// Tasks newly marked skipped (transitively) because of a failure.
    pub newly_skipped: Vec<SkippedTask>,
}

impl SchedulerStep {
    pub fn is_empty(&self) -> bool {
        self.newly_ready.is_empty() && self.newly_skipped.is_empty()
    }
}
