// src/dag/graph.rs

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::dag::task_info::TaskId;
use crate::errors::{FuturoError, Result};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    label: Option<String>,
    /// Direct dependencies, in declaration order.
    deps: Vec<usize>,
    /// Direct dependents, in the order the edges were added.
    dependents: Vec<usize>,
}

/// Index-addressed task graph owned by one scheduler.
///
/// Adjacency lists drive scheduling; a petgraph mirror (edge direction
/// `dep -> task`) answers reachability so every edge is checked for cycles
/// the moment it is added.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    scope: u64,
    nodes: Vec<DagNode>,
    edges: DiGraphMap<usize, ()>,
}

impl TaskGraph {
    pub fn new(scope: u64) -> Self {
        Self {
            scope,
            nodes: Vec::new(),
            edges: DiGraphMap::new(),
        }
    }

    pub(crate) fn scope(&self) -> u64 {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        id.scope() == self.scope && id.index() < self.nodes.len()
    }

    /// Add a node without edges and return its id.
    pub fn add_node(&mut self, label: Option<String>) -> TaskId {
        let index = self.nodes.len();
        self.nodes.push(DagNode {
            label,
            deps: Vec::new(),
            dependents: Vec::new(),
        });
        self.edges.add_node(index);
        TaskId::new(self.scope, index)
    }

    /// Declare that `task` depends on `dep`.
    ///
    /// Returns `Ok(false)` if the edge already existed. Fails without
    /// modifying the graph if either id is unknown or the edge would close a
    /// cycle (a self edge counts as one).
    pub fn add_edge(&mut self, task: TaskId, dep: TaskId) -> Result<bool> {
        if !self.contains(task) {
            return Err(FuturoError::UnknownTask(task));
        }
        if !self.contains(dep) {
            return Err(FuturoError::UnknownDependency {
                task,
                dependency: dep,
            });
        }
        if task == dep {
            return Err(FuturoError::DagCycle(format!(
                "{} cannot depend on itself",
                self.describe(task)
            )));
        }

        let (t, d) = (task.index(), dep.index());
        if self.edges.contains_edge(d, t) {
            return Ok(false);
        }

        // A path task -> ... -> dep means dep already waits on task.
        if has_path_connecting(&self.edges, t, d, None) {
            return Err(FuturoError::DagCycle(format!(
                "making {} depend on {} would close a cycle",
                self.describe(task),
                self.describe(dep)
            )));
        }

        self.edges.add_edge(d, t, ());
        self.nodes[t].deps.push(d);
        self.nodes[d].dependents.push(t);
        Ok(true)
    }

    pub fn label(&self, id: TaskId) -> Option<&str> {
        self.node(id).and_then(|n| n.label.as_deref())
    }

    /// `label (task#n)` when labelled, otherwise `task#n`. Used in logs and errors.
    pub fn describe(&self, id: TaskId) -> String {
        match self.label(id) {
            Some(label) => format!("{label} ({id})"),
            None => id.to_string(),
        }
    }

    /// Immediate dependencies of a task, in declaration order.
    pub fn dependencies_of(&self, id: TaskId) -> Vec<TaskId> {
        self.ids_of(id, |n| &n.deps)
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskId> {
        self.ids_of(id, |n| &n.dependents)
    }

    pub fn dependency_count(&self, id: TaskId) -> usize {
        self.node(id).map(|n| n.deps.len()).unwrap_or(0)
    }

    /// All task ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        (0..self.nodes.len()).map(|index| TaskId::new(self.scope, index))
    }

    /// Tasks without dependencies.
    pub fn roots(&self) -> Vec<TaskId> {
        self.ids()
            .filter(|id| self.dependency_count(*id) == 0)
            .collect()
    }

    /// A dependency-respecting order of every task.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        match toposort(&self.edges, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|index| TaskId::new(self.scope, index))
                .collect()),
            Err(cycle) => Err(FuturoError::DagCycle(format!(
                "cycle detected in task graph involving {}",
                self.describe(TaskId::new(self.scope, cycle.node_id()))
            ))),
        }
    }

    fn node(&self, id: TaskId) -> Option<&DagNode> {
        if id.scope() != self.scope {
            return None;
        }
        self.nodes.get(id.index())
    }

    fn ids_of(&self, id: TaskId, pick: impl Fn(&DagNode) -> &Vec<usize>) -> Vec<TaskId> {
        self.node(id)
            .map(|n| {
                pick(n)
                    .iter()
                    .map(|&index| TaskId::new(self.scope, index))
                    .collect()
            })
            .unwrap_or_default()
    }
}
