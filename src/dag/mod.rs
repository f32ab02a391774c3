// src/dag/mod.rs

//! Task graph and dependency-ordered execution.
//!
//! - [`graph`] holds the index-addressed task graph with cycle checks.
//! - [`scheduler`] contains `DependencyScheduler`, which drives a run
//!   against an executor.
//! - [`state_manager`] is the thread-free readiness state machine.
//! - [`scheduler_step`] defines the result type of one readiness update.
//! - [`task_info`] provides task ids and run states.
//! - [`upstream`] gives task bodies access to their dependencies' values.
//! - [`report`] is the task -> handle mapping returned by a run.

pub mod graph;
pub mod report;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;
pub mod upstream;

pub use graph::TaskGraph;
pub use report::RunReport;
pub use scheduler::DependencyScheduler;
pub use scheduler_step::{SchedulerStep, SkippedTask};
pub use state_manager::StateManager;
pub use task_info::{TaskId, TaskRunState};
pub use upstream::Upstream;
