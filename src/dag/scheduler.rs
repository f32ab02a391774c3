// src/dag/scheduler.rs

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, warn};

use crate::config::SchedulerSection;
use crate::dag::graph::TaskGraph;
use crate::dag::report::RunReport;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::TaskId;
use crate::dag::upstream::Upstream;
use crate::errors::{FuturoError, Result};
use crate::exec::backend::Executor;
use crate::exec::handle::{Completion, HandleStatus, Waiter};
use crate::forward::ForwardingHandle;
use crate::types::FailurePolicy;

type Body<T> = Box<dyn FnOnce(&Upstream<T>) -> anyhow::Result<T> + Send + 'static>;

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Runs a graph of tasks against an [`Executor`], submitting each task only
/// once all of its dependencies are terminal.
///
/// It is responsible for:
/// - building the graph and rejecting unknown ids and cycles as they are added
/// - submitting the initial ready set, then reacting to completions
/// - applying the configured [`FailurePolicy`] to dependents of failed tasks
/// - draining every submitted task before returning
///
/// A scheduler runs at most once; a second `run` fails with
/// [`FuturoError::AlreadyRun`].
pub struct DependencyScheduler<T> {
    graph: TaskGraph,
    bodies: Vec<Option<Body<T>>>,
    // Per task, the dependencies its `Upstream` exposes, duplicates included.
    inputs: Vec<Vec<TaskId>>,
    policy: FailurePolicy,
    has_run: bool,
}

/// A submitted task the run loop is still waiting on.
struct InFlight<T> {
    task: TaskId,
    handle: ForwardingHandle<T>,
}

impl<T> Completion for InFlight<T> {
    fn is_terminal(&self) -> bool {
        self.handle.is_terminal()
    }

    fn subscribe(&self, waiter: &Waiter) {
        Completion::subscribe(&self.handle, waiter)
    }

    fn unsubscribe(&self, waiter: &Waiter) {
        Completion::unsubscribe(&self.handle, waiter)
    }
}

impl<T> Default for DependencyScheduler<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DependencyScheduler<T>
where
    T: Send + Sync + 'static,
{
    /// Empty scheduler with the default failure policy (propagate-skip).
    pub fn new() -> Self {
        Self::with_policy(FailurePolicy::default())
    }

    pub fn with_policy(policy: FailurePolicy) -> Self {
        let scope = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        Self {
            graph: TaskGraph::new(scope),
            bodies: Vec::new(),
            inputs: Vec::new(),
            policy,
            has_run: false,
        }
    }

    /// Build an empty scheduler from the `[scheduler]` config section.
    pub fn from_config(cfg: &SchedulerSection) -> Self {
        Self::with_policy(cfg.failure_policy)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Register a task that runs once every task in `deps` is terminal.
    ///
    /// Every dependency must already be registered with this scheduler.
    /// Returns the new task's id.
    pub fn register<F>(&mut self, deps: &[TaskId], body: F) -> Result<TaskId>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.insert(None, deps, Box::new(move |_: &Upstream<T>| body()))
    }

    /// Like [`register`](Self::register), with a label used in logs and reports.
    pub fn register_named<F>(
        &mut self,
        label: impl Into<String>,
        deps: &[TaskId],
        body: F,
    ) -> Result<TaskId>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        self.insert(
            Some(label.into()),
            deps,
            Box::new(move |_: &Upstream<T>| body()),
        )
    }

    /// Register a task whose body reads its dependencies' values.
    ///
    /// The body receives an [`Upstream`] holding the dependencies' handles in
    /// the order given in `deps` (edges added later with
    /// [`add_dependency`](Self::add_dependency) follow). A dependency listed
    /// twice is one graph edge but keeps both positions in the `Upstream`.
    pub fn register_with<F>(&mut self, deps: &[TaskId], body: F) -> Result<TaskId>
    where
        F: FnOnce(&Upstream<T>) -> anyhow::Result<T> + Send + 'static,
    {
        self.insert(None, deps, Box::new(body))
    }

    pub fn register_named_with<F>(
        &mut self,
        label: impl Into<String>,
        deps: &[TaskId],
        body: F,
    ) -> Result<TaskId>
    where
        F: FnOnce(&Upstream<T>) -> anyhow::Result<T> + Send + 'static,
    {
        self.insert(Some(label.into()), deps, Box::new(body))
    }

    /// Make `task` additionally depend on `dep`.
    ///
    /// Fails with [`FuturoError::DagCycle`] if the edge would close a cycle;
    /// the graph is left unchanged in that case. Adding an existing edge is a
    /// no-op.
    pub fn add_dependency(&mut self, task: TaskId, dep: TaskId) -> Result<()> {
        if self.has_run {
            return Err(FuturoError::AlreadyRun);
        }

        if self.graph.add_edge(task, dep)? {
            if let Some(inputs) = self.inputs.get_mut(task.index()) {
                inputs.push(dep);
            }
            debug!(
                task = %self.graph.describe(task),
                dependency = %self.graph.describe(dep),
                "dependency added"
            );
        }
        Ok(())
    }

    fn insert(&mut self, label: Option<String>, deps: &[TaskId], body: Body<T>) -> Result<TaskId> {
        if self.has_run {
            return Err(FuturoError::AlreadyRun);
        }

        if let Some(unknown) = deps.iter().find(|dep| !self.graph.contains(**dep)) {
            // The id the task would have received.
            let task = TaskId::new(self.graph.scope(), self.graph.len());
            warn!(task = %task, dependency = %unknown, "rejecting unknown dependency");
            return Err(FuturoError::UnknownDependency {
                task,
                dependency: *unknown,
            });
        }

        let id = self.graph.add_node(label);
        for dep in deps {
            self.graph.add_edge(id, *dep)?;
        }
        self.bodies.push(Some(body));
        self.inputs.push(deps.to_vec());

        debug!(
            task = %self.graph.describe(id),
            deps = deps.len(),
            "task registered"
        );
        Ok(id)
    }

    pub fn label(&self, task: TaskId) -> Option<&str> {
        self.graph.label(task)
    }

    pub fn dependencies_of(&self, task: TaskId) -> Vec<TaskId> {
        self.graph.dependencies_of(task)
    }

    pub fn dependents_of(&self, task: TaskId) -> Vec<TaskId> {
        self.graph.dependents_of(task)
    }

    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        self.graph.topological_order()
    }

    /// Run every registered task and block until all of them are terminal.
    ///
    /// - Tasks without dependencies are submitted first, all at once.
    /// - After each completion the dependents' counts are updated and every
    ///   task whose last dependency finished is submitted immediately.
    /// - A failing task never aborts the run; what happens to its dependents
    ///   is governed by the [`FailurePolicy`].
    ///
    /// If the executor rejects a submission, no further tasks are submitted;
    /// the handles already in flight are drained and
    /// [`FuturoError::Scheduling`] is returned.
    pub fn run<E: Executor>(&mut self, executor: &E) -> Result<RunReport<T>> {
        if self.has_run {
            warn!("scheduler already ran; rejecting second run");
            return Err(FuturoError::AlreadyRun);
        }
        self.has_run = true;

        let mut bodies = std::mem::take(&mut self.bodies);
        let task_count = self.graph.len();
        let mut state = StateManager::new(&self.graph, self.policy);
        let mut handles: Vec<Option<ForwardingHandle<T>>> =
            (0..task_count).map(|_| None).collect();
        let mut submission_order = Vec::with_capacity(task_count);
        let mut in_flight: Vec<InFlight<T>> = Vec::new();
        let mut scheduling_error: Option<FuturoError> = None;

        info!(tasks = task_count, policy = %self.policy, "starting run");

        let initial = state.initial_ready();
        self.submit_batch(
            executor,
            initial,
            &mut bodies,
            &mut handles,
            &mut in_flight,
            &mut submission_order,
            &mut scheduling_error,
        );

        while !in_flight.is_empty() {
            let (done, pending) = executor.wait_any(in_flight);
            in_flight = pending;

            for finished in done {
                let succeeded = finished.handle.status() == HandleStatus::Resolved;
                if succeeded {
                    debug!(task = %self.graph.describe(finished.task), "task succeeded");
                } else {
                    let reason = finished
                        .handle
                        .failure()
                        .map(|f| f.to_string())
                        .unwrap_or_default();
                    warn!(
                        task = %self.graph.describe(finished.task),
                        error = %reason,
                        "task failed"
                    );
                }

                let step = state.complete(finished.task, succeeded);
                handles[finished.task.index()] = Some(finished.handle);

                for skipped in step.newly_skipped {
                    info!(
                        task = %self.graph.describe(skipped.task),
                        failed_dependency = %self.graph.describe(skipped.failed_dependency),
                        "task skipped"
                    );
                    handles[skipped.task.index()] = Some(ForwardingHandle::skipped(
                        skipped.task,
                        skipped.failed_dependency,
                    ));
                }

                self.submit_batch(
                    executor,
                    step.newly_ready,
                    &mut bodies,
                    &mut handles,
                    &mut in_flight,
                    &mut submission_order,
                    &mut scheduling_error,
                );
            }
        }

        if let Some(err) = scheduling_error {
            error!(error = %err, "run aborted after draining in-flight tasks");
            return Err(err);
        }

        let mut report = RunReport::new(submission_order);
        for id in self.graph.ids() {
            let handle = handles[id.index()].take().ok_or_else(|| {
                FuturoError::Scheduling(format!(
                    "{} never reached a terminal state",
                    self.graph.describe(id)
                ))
            })?;
            let task_state = state.state_of(id).ok_or(FuturoError::UnknownTask(id))?;
            report.push(id, self.graph.label(id).map(str::to_string), task_state, handle);
        }

        info!(
            tasks = task_count,
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            skipped = report.skipped().len(),
            "run finished"
        );
        Ok(report)
    }

    /// Submit `ready` in order. After the first rejected submission nothing
    /// else is submitted for the rest of the run.
    #[allow(clippy::too_many_arguments)]
    fn submit_batch<E: Executor>(
        &self,
        executor: &E,
        ready: Vec<TaskId>,
        bodies: &mut [Option<Body<T>>],
        handles: &mut [Option<ForwardingHandle<T>>],
        in_flight: &mut Vec<InFlight<T>>,
        submission_order: &mut Vec<TaskId>,
        scheduling_error: &mut Option<FuturoError>,
    ) {
        for task in ready {
            if scheduling_error.is_some() {
                return;
            }

            match self.submit_task(executor, task, bodies, handles) {
                Ok(handle) => {
                    submission_order.push(task);
                    in_flight.push(InFlight { task, handle });
                }
                Err(err) => {
                    error!(
                        task = %self.graph.describe(task),
                        error = %err,
                        "submission rejected; no further tasks will be submitted"
                    );
                    *scheduling_error = Some(err);
                }
            }
        }
    }

    fn submit_task<E: Executor>(
        &self,
        executor: &E,
        task: TaskId,
        bodies: &mut [Option<Body<T>>],
        handles: &[Option<ForwardingHandle<T>>],
    ) -> Result<ForwardingHandle<T>> {
        let body = bodies
            .get_mut(task.index())
            .and_then(Option::take)
            .ok_or_else(|| {
                FuturoError::Scheduling(format!(
                    "{} was already submitted",
                    self.graph.describe(task)
                ))
            })?;

        let entries = self
            .inputs
            .get(task.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&dep| {
                handles
                    .get(dep.index())
                    .and_then(|h| h.clone())
                    .map(|h| (dep, h))
                    .ok_or_else(|| {
                        FuturoError::Scheduling(format!(
                            "dependency {dep} of {task} has no handle"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let upstream = Upstream::new(entries);

        let handle = executor.submit(move || body(&upstream))?;
        info!(task = %self.graph.describe(task), "task submitted");
        Ok(handle)
    }
}
