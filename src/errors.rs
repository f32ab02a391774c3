// src/errors.rs

//! Crate-wide error type, failure payloads and the `Result` alias.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::dag::TaskId;

#[derive(Error, Debug)]
pub enum FuturoError {
    #[error("Unknown task {0} (not registered with this scheduler)")]
    UnknownTask(TaskId),

    #[error("Task {task} depends on unknown task {dependency}")]
    UnknownDependency { task: TaskId, dependency: TaskId },

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Scheduler has already run; build a new scheduler for another run")]
    AlreadyRun,

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Task failed: {0}")]
    Task(TaskFailure),

    #[error("Timed out after {0:?} waiting for a result")]
    Timeout(Duration),

    #[error("Task {task} was skipped because dependency {failed_dependency} failed")]
    Skipped {
        task: TaskId,
        failed_dependency: TaskId,
    },

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`FuturoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown task or dependency, cycle, or re-running a scheduler.
    Registration,
    /// Submission to an executor that has been shut down.
    Scheduling,
    /// A task body returned an error or panicked.
    Task,
    /// A bounded wait elapsed before the handle became terminal.
    Timeout,
    /// The value can never be produced (skipped task, bad upstream index).
    Resolution,
    Config,
    Other,
}

impl FuturoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FuturoError::UnknownTask(_)
            | FuturoError::UnknownDependency { .. }
            | FuturoError::DagCycle(_)
            | FuturoError::AlreadyRun => ErrorKind::Registration,
            FuturoError::Scheduling(_) => ErrorKind::Scheduling,
            FuturoError::Task(_) => ErrorKind::Task,
            FuturoError::Timeout(_) => ErrorKind::Timeout,
            FuturoError::Skipped { .. } | FuturoError::Resolution(_) => ErrorKind::Resolution,
            FuturoError::ConfigError(_) | FuturoError::TomlError(_) => ErrorKind::Config,
            FuturoError::IoError(_) | FuturoError::Other(_) => ErrorKind::Other,
        }
    }
}

/// Failure captured from a task body.
///
/// Cheap to clone so every reader of a terminal handle observes the same
/// failure.
#[derive(Debug, Clone)]
pub enum TaskFailure {
    /// The body returned `Err`.
    Error(Arc<anyhow::Error>),
    /// The body panicked; holds the panic message.
    Panicked(String),
    /// The executor discarded the job without running it.
    Dropped,
}

impl TaskFailure {
    /// The underlying error, if the body returned one.
    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            TaskFailure::Error(err) => Some(err),
            TaskFailure::Panicked(_) | TaskFailure::Dropped => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, TaskFailure::Panicked(_))
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, TaskFailure::Dropped)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Error(err) => write!(f, "{err:#}"),
            TaskFailure::Panicked(msg) => write!(f, "task panicked: {msg}"),
            TaskFailure::Dropped => f.write_str("job dropped before running"),
        }
    }
}

impl From<anyhow::Error> for TaskFailure {
    fn from(err: anyhow::Error) -> Self {
        TaskFailure::Error(Arc::new(err))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FuturoError>;
