// src/exec/task_runner.rs

//! Runs a single task body and stores its outcome.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::errors::TaskFailure;
use crate::exec::handle::Completer;

/// Run `job` on the current thread and complete the handle with its outcome.
///
/// - `Ok(value)` resolves the handle.
/// - `Err(e)` fails it with [`TaskFailure::Error`].
/// - A panic is caught and recorded as [`TaskFailure::Panicked`], so the
///   worker thread survives.
pub fn run_job<T, F>(job: F, completer: Completer<T>, seq: u64)
where
    F: FnOnce() -> anyhow::Result<T>,
{
    debug!(seq, "starting job");

    let outcome = match catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(value)) => {
            debug!(seq, "job finished successfully");
            Ok(value)
        }
        Ok(Err(err)) => {
            warn!(seq, error = %err, "job returned an error");
            Err(TaskFailure::from(err))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(seq, panic_message = %message, "job panicked");
            Err(TaskFailure::Panicked(message))
        }
    };

    completer.complete(outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
