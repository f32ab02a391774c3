#![allow(dead_code)]

use std::thread;
use std::time::Duration;

use futuro::errors::Result;
use futuro::{DependencyScheduler, TaskId, Upstream};

/// Ids of the four tasks in a diamond: `f1 -> {f2, f3} -> f4`.
#[derive(Debug, Clone, Copy)]
pub struct Diamond {
    pub f1: TaskId,
    pub f2: TaskId,
    pub f3: TaskId,
    pub f4: TaskId,
}

impl Diamond {
    pub fn all(&self) -> [TaskId; 4] {
        [self.f1, self.f2, self.f3, self.f4]
    }
}

/// The A/B/C/D graph: A returns 1, B and C depend on A and return 2 and 3,
/// D depends on B and C and returns B + C.
///
/// Each body sleeps for `delay` first.
pub fn sum_diamond(s: &mut DependencyScheduler<i64>, delay: Duration) -> Result<Diamond> {
    let f1 = s.register_named("A", &[], move || {
        thread::sleep(delay);
        Ok(1)
    })?;
    let f2 = s.register_named("B", &[f1], move || {
        thread::sleep(delay);
        Ok(2)
    })?;
    let f3 = s.register_named("C", &[f1], move || {
        thread::sleep(delay);
        Ok(3)
    })?;
    let f4 = s.register_named_with("D", &[f2, f3], move |up: &Upstream<i64>| {
        thread::sleep(delay);
        Ok(up.value(0)? + up.value(1)?)
    })?;
    Ok(Diamond { f1, f2, f3, f4 })
}

/// A diamond whose bodies sleep for the given per-task delays and return
/// their 1-based position.
pub fn timed_diamond(s: &mut DependencyScheduler<i64>, delays: [Duration; 4]) -> Result<Diamond> {
    let [d1, d2, d3, d4] = delays;
    let f1 = s.register_named("f1", &[], move || sleep_then(d1, 1))?;
    let f2 = s.register_named("f2", &[f1], move || sleep_then(d2, 2))?;
    let f3 = s.register_named("f3", &[f1], move || sleep_then(d3, 3))?;
    let f4 = s.register_named("f4", &[f2, f3], move || sleep_then(d4, 4))?;
    Ok(Diamond { f1, f2, f3, f4 })
}

/// A linear chain `t0 -> t1 -> ... -> t(len-1)` where each task adds one to
/// its predecessor's value (t0 returns 0).
pub fn chain(s: &mut DependencyScheduler<i64>, len: usize) -> Result<Vec<TaskId>> {
    let mut ids: Vec<TaskId> = Vec::with_capacity(len);
    for i in 0..len {
        let id = match ids.last() {
            None => s.register_named(format!("t{i}"), &[], || Ok(0))?,
            Some(prev) => s.register_named_with(
                format!("t{i}"),
                &[*prev],
                |up: &Upstream<i64>| Ok(up.value(0)? + 1),
            )?,
        };
        ids.push(id);
    }
    Ok(ids)
}

fn sleep_then(delay: Duration, value: i64) -> anyhow::Result<i64> {
    thread::sleep(delay);
    Ok(value)
}
