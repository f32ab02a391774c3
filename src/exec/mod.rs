// src/exec/mod.rs

//! Execution layer.
//!
//! The scheduler never runs task bodies itself; it hands them to an
//! [`Executor`] and watches the returned handles.
//!
//! - [`handle`] is the shared terminal-state slot plus the `wait_any`
//!   primitive.
//! - [`backend`] defines the `Executor` trait the scheduler depends on.
//! - [`task_runner`] runs one body on a worker thread and completes its
//!   handle (catching panics).
//! - [`pool`] provides `WorkerPool`, a bounded pool of OS threads.
//! - [`tokio_backend`] adapts a Tokio runtime's blocking pool.

pub mod backend;
pub mod handle;
pub mod pool;
pub mod task_runner;
pub mod tokio_backend;

pub use backend::Executor;
pub use handle::{Completer, Completion, Handle, HandleStatus, Waiter, wait_all, wait_any};
pub use pool::WorkerPool;
pub use tokio_backend::TokioExecutor;
