// src/demo.rs

//! Built-in scenarios run by the `futuro` binary.
//!
//! Each graph scenario is a handful of sleeping tasks whose values flow
//! through [`Upstream`]. Task logs (stderr) show the order in which work
//! finished; stdout gets one line per task plus a summary.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use tracing::info;

use crate::cli::Scenario;
use crate::dag::{DependencyScheduler, RunReport, Upstream};
use crate::exec::Executor;
use crate::types::FailurePolicy;

/// Simulated work: sleep for `units * unit`, then return `value`.
fn work(name: &str, units: u32, unit: Duration, value: i64) -> i64 {
    thread::sleep(unit * units);
    info!(task = name, value, "work finished");
    value
}

/// Build the task graph for a scenario.
///
/// Returns `None` for [`Scenario::Forwarding`], which has no graph.
pub fn build_scenario(
    scenario: Scenario,
    unit: Duration,
    policy: FailurePolicy,
) -> crate::errors::Result<Option<DependencyScheduler<i64>>> {
    let mut s = DependencyScheduler::with_policy(policy);

    match scenario {
        Scenario::Diamond => {
            let f1 = s.register_named("f1", &[], move || Ok(work("f1", 1, unit, 1)))?;
            let f2 = s.register_named_with("f2", &[f1], move |up: &Upstream<i64>| {
                let base = *up.value(0)?;
                Ok(work("f2", 10, unit, base * 2))
            })?;
            let f3 = s.register_named_with("f3", &[f1], move |up: &Upstream<i64>| {
                let base = *up.value(0)?;
                Ok(work("f3", 1, unit, base * 3))
            })?;
            s.register_named_with("f4", &[f2, f3], move |up: &Upstream<i64>| {
                let sum = up.value(0)? + up.value(1)?;
                Ok(work("f4", 1, unit, sum))
            })?;
        }
        Scenario::Chain => {
            let f1 = s.register_named("f1", &[], move || Ok(work("f1", 1, unit, 1)))?;
            s.register_named_with("f2", &[f1], move |up: &Upstream<i64>| {
                let base = *up.value(0)?;
                Ok(work("f2", 10, unit, base + 1))
            })?;
            let f3 = s.register_named_with("f3", &[f1], move |up: &Upstream<i64>| {
                let base = *up.value(0)?;
                Ok(work("f3", 1, unit, base + 2))
            })?;
            s.register_named_with("f4", &[f3], move |up: &Upstream<i64>| {
                let base = *up.value(0)?;
                Ok(work("f4", 1, unit, base + 1))
            })?;
        }
        Scenario::FanIn => {
            let a = s.register_named("a", &[], move || Ok(work("a", 1, unit, 1)))?;
            let b = s.register_named("b", &[], move || Ok(work("b", 2, unit, 2)))?;
            let c = s.register_named("c", &[], move || Ok(work("c", 3, unit, 3)))?;
            s.register_named_with("total", &[a, b, c], move |up: &Upstream<i64>| {
                let total: i64 = up.values()?.into_iter().sum();
                Ok(work("total", 1, unit, total))
            })?;
        }
        Scenario::Failing => {
            let fetch = s.register_named("fetch", &[], move || -> anyhow::Result<i64> {
                thread::sleep(unit);
                Err(anyhow!("upstream service unavailable"))
            })?;
            let parse = s.register_named_with("parse", &[fetch], move |up: &Upstream<i64>| {
                let raw = *up.value(0)?;
                Ok(work("parse", 1, unit, raw * 10))
            })?;
            s.register_named_with("render", &[parse], move |up: &Upstream<i64>| {
                let parsed = *up.value(0)?;
                Ok(work("render", 1, unit, parsed + 1))
            })?;
            s.register_named("audit", &[], move || Ok(work("audit", 2, unit, 7)))?;
        }
        Scenario::Forwarding => return Ok(None),
    }

    Ok(Some(s))
}

/// Topological order of a scenario graph, one line per task.
pub fn describe_order(
    scheduler: &DependencyScheduler<i64>,
) -> crate::errors::Result<Vec<String>> {
    let order = scheduler.topological_order()?;
    Ok(order
        .into_iter()
        .map(|id| {
            let deps: Vec<String> = scheduler
                .dependencies_of(id)
                .into_iter()
                .map(|dep| scheduler.graph().describe(dep))
                .collect();
            if deps.is_empty() {
                scheduler.graph().describe(id)
            } else {
                format!("{} <- {}", scheduler.graph().describe(id), deps.join(", "))
            }
        })
        .collect())
}

/// Run a scenario graph and render one line per task.
pub fn run_graph<E: Executor>(
    mut scheduler: DependencyScheduler<i64>,
    executor: &E,
) -> Result<Vec<String>> {
    let started = Instant::now();
    let report = scheduler.run(executor)?;
    let elapsed = started.elapsed();

    let mut lines = render_report(&report);
    lines.push(format!(
        "{} succeeded, {} failed, {} skipped in {:.2?}",
        report.succeeded().len(),
        report.failed().len(),
        report.skipped().len(),
        elapsed
    ));
    Ok(lines)
}

fn render_report(report: &RunReport<i64>) -> Vec<String> {
    report
        .iter()
        .map(|(id, handle)| {
            let name = report
                .label(id)
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string());
            let state = report
                .state_of(id)
                .map(|s| format!("{s:?}"))
                .unwrap_or_default();
            match handle.get() {
                Ok(value) => format!("{name:<8} {state:<9} = {value}"),
                Err(err) => format!("{name:<8} {state:<9} : {err}"),
            }
        })
        .collect()
}

/// Submit four values straight to the executor and operate on the handles
/// before they are resolved.
pub fn run_forwarding<E: Executor>(executor: &E, unit: Duration) -> Result<Vec<String>> {
    let x = executor.submit(move || {
        thread::sleep(unit * 3);
        Ok(1.0_f64)
    })?;
    let y = executor.submit(move || {
        thread::sleep(unit);
        Ok(2.0_f64)
    })?;
    let z = executor.submit(move || {
        thread::sleep(unit * 2);
        Ok(3.0_f64)
    })?;
    let w = executor.submit(|| Ok(0.0_f64))?;

    let mut lines = vec![format!("x before resolving: {x}")];
    lines.push(format!("x + 5    = {}", (&x + 5.0)?));
    lines.push(format!("y + z    = {}", (&y + &z)?));
    lines.push(format!("cos(w)   = {}", w.map(|v| v.cos())?));
    lines.push(format!("x after resolving:  {x}"));
    Ok(lines)
}
