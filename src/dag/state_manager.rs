// src/dag/state_manager.rs

//! Per-run readiness bookkeeping.
//!
//! Pure state machine: no threads, no executor. The scheduler feeds it
//! completions and submits whatever it reports as ready.

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::{SchedulerStep, SkippedTask};
use crate::dag::task_info::{RunState, TaskId, TaskNode, TaskRunState};
use crate::types::FailurePolicy;

/// Tracks unmet-dependency counts and run states for one run over a graph.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    nodes: Vec<TaskNode>,
    policy: FailurePolicy,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a TaskGraph, policy: FailurePolicy) -> Self {
        let nodes = graph
            .ids()
            .map(|id| TaskNode::new(graph.dependency_count(id)))
            .collect();
        Self {
            graph,
            nodes,
            policy,
        }
    }

    /// Mark every task without dependencies as `Running` and return them.
    ///
    /// Only the first call returns anything.
    pub fn initial_ready(&mut self) -> Vec<TaskId> {
        let ready: Vec<TaskId> = self
            .graph
            .ids()
            .filter(|id| {
                let node = &self.nodes[id.index()];
                node.remaining == 0 && node.run_state == RunState::Waiting
            })
            .collect();

        for id in &ready {
            self.nodes[id.index()].run_state = RunState::Running;
        }

        debug!(count = ready.len(), "initial ready set computed");
        ready
    }

    /// Record that a running task reached a terminal state.
    ///
    /// - On success every dependent's count is decremented; dependents that
    ///   reach zero are marked `Running` and returned in `newly_ready`.
    /// - On failure under [`FailurePolicy::PropagateSkip`] every transitive
    ///   dependent still waiting is marked skipped.
    /// - On failure under [`FailurePolicy::ProceedRegardless`] the failure is
    ///   counted like a success.
    pub fn complete(&mut self, task: TaskId, succeeded: bool) -> SchedulerStep {
        let mut step = SchedulerStep::default();

        if !self.graph.contains(task) {
            warn!(task = %task, "completion reported for unknown task");
            return step;
        }

        let node = &mut self.nodes[task.index()];
        if node.run_state != RunState::Running {
            warn!(
                task = %task,
                state = ?node.run_state,
                "completion reported for task that is not running; ignoring"
            );
            return step;
        }

        node.run_state = if succeeded {
            RunState::DoneSuccess
        } else {
            RunState::DoneFailed
        };

        if !succeeded && self.policy == FailurePolicy::PropagateSkip {
            step.newly_skipped = self.mark_dependents_skipped(task);
            return step;
        }

        for dependent in self.graph.dependents_of(task) {
            let node = &mut self.nodes[dependent.index()];
            node.remaining = node.remaining.saturating_sub(1);

            if node.remaining == 0 && node.run_state == RunState::Waiting {
                node.run_state = RunState::Running;
                debug!(task = %dependent, "dependencies terminal; ready");
                step.newly_ready.push(dependent);
            }
        }

        step
    }

    /// Mark every waiting transitive dependent of `failed` as skipped.
    fn mark_dependents_skipped(&mut self, failed: TaskId) -> Vec<SkippedTask> {
        let mut stack = self.graph.dependents_of(failed);
        let mut newly_skipped = Vec::new();

        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if node.run_state != RunState::Waiting {
                continue;
            }

            node.run_state = RunState::Skipped(failed);
            debug!(
                task = %id,
                failed_dependency = %failed,
                "skipping task due to upstream failure"
            );
            newly_skipped.push(SkippedTask {
                task: id,
                failed_dependency: failed,
            });
            stack.extend(self.graph.dependents_of(id));
        }

        newly_skipped
    }

    pub fn state_of(&self, task: TaskId) -> Option<TaskRunState> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(self.nodes[task.index()].run_state.into())
    }

    /// Unmet-dependency count of a task.
    pub fn remaining(&self, task: TaskId) -> Option<usize> {
        if !self.graph.contains(task) {
            return None;
        }
        Some(self.nodes[task.index()].remaining)
    }

    /// The failed task that caused `task` to be skipped.
    pub fn skip_cause(&self, task: TaskId) -> Option<TaskId> {
        if !self.graph.contains(task) {
            return None;
        }
        match self.nodes[task.index()].run_state {
            RunState::Skipped(cause) => Some(cause),
            _ => None,
        }
    }

    /// Whether every task is in a terminal state.
    pub fn all_terminal(&self) -> bool {
        self.nodes.iter().all(|n| n.run_state.is_terminal())
    }

    /// Snapshot of every task's state, indexed by registration order.
    pub fn states(&self) -> Vec<TaskRunState> {
        self.nodes.iter().map(|n| n.run_state.into()).collect()
    }
}
