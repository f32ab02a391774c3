// src/lib.rs

//! Dependency-ordered task scheduling and forwarding handles over a
//! worker-pool executor.
//!
//! - [`dag`]: register tasks with dependencies and run them with
//!   [`DependencyScheduler`]; a task is submitted only once every dependency
//!   is terminal.
//! - [`exec`]: the [`Executor`] contract plus [`WorkerPool`] and
//!   [`TokioExecutor`].
//! - [`forward`]: [`ForwardingHandle`], a placeholder that blocks on first
//!   use, caches the value and forwards operations to it.

pub mod cli;
pub mod config;
pub mod dag;
pub mod demo;
pub mod errors;
pub mod exec;
pub mod forward;
pub mod logging;
pub mod types;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

pub use crate::dag::{DependencyScheduler, RunReport, TaskId, TaskRunState, Upstream};
pub use crate::errors::{ErrorKind, FuturoError, TaskFailure};
pub use crate::exec::{Executor, Handle, HandleStatus, TokioExecutor, WorkerPool};
pub use crate::forward::ForwardingHandle;
pub use crate::types::FailurePolicy;

use crate::cli::{CliArgs, Scenario};
use crate::config::model::ConfigFile;
use crate::config::{default_config_path, load_and_validate};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (explicit path, `$FUTURO_CONFIG`, `Futuro.toml`, or defaults)
/// - CLI overrides for pool size and failure policy
/// - the worker pool
/// - the selected scenario
pub fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;

    if let Some(workers) = args.workers {
        cfg.pool.workers = workers;
    }
    if let Some(policy) = args.policy {
        cfg.scheduler.failure_policy = policy;
    }

    let unit = Duration::from_millis(args.scale_ms);
    let scheduler = demo::build_scenario(args.scenario, unit, cfg.scheduler.failure_policy)?;

    if args.dry_run {
        print_dry_run(args.scenario, &cfg, scheduler.as_ref())?;
        return Ok(());
    }

    let pool = WorkerPool::from_config(&cfg.pool)?;
    info!(
        scenario = ?args.scenario,
        workers = pool.size(),
        policy = %cfg.scheduler.failure_policy,
        "running scenario"
    );

    let lines = match scheduler {
        Some(scheduler) => demo::run_graph(scheduler, &pool)?,
        None => demo::run_forwarding(&pool, unit)?,
    };

    pool.shutdown(true);

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return Ok(load_and_validate(path)?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!(path = %path.display(), "loading default config");
        Ok(load_and_validate(&path)?)
    } else {
        debug!("no config file found; using built-in defaults");
        Ok(ConfigFile::default())
    }
}

fn print_dry_run(
    scenario: Scenario,
    cfg: &ConfigFile,
    scheduler: Option<&DependencyScheduler<i64>>,
) -> Result<()> {
    println!("futuro dry run");
    println!("scenario:       {scenario:?}");
    println!("workers:        {}", cfg.pool.workers);
    println!("thread_name:    {}", cfg.pool.thread_name);
    println!("failure_policy: {}", cfg.scheduler.failure_policy);

    match scheduler {
        Some(scheduler) => {
            println!();
            println!("tasks in topological order:");
            for line in demo::describe_order(scheduler)? {
                println!("  {line}");
            }
        }
        None => println!("(no task graph; submits directly to the pool)"),
    }

    Ok(())
}
