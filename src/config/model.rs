// src/config/model.rs

use serde::Deserialize;

use crate::types::FailurePolicy;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [pool]
/// workers = 4
/// thread_name = "futuro-worker"
///
/// [scheduler]
/// failure_policy = "propagate-skip"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,
}

/// Validated configuration. Obtain one via `ConfigFile::try_from(raw)` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub pool: PoolSection,
    pub scheduler: SchedulerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(pool: PoolSection, scheduler: SchedulerSection) -> Self {
        Self { pool, scheduler }
    }
}

/// `[pool]` section: sizing of the built-in worker pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSection {
    /// Number of worker threads. Defaults to the available parallelism.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Prefix for worker thread names; threads are named `<prefix>-<n>`.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_thread_name() -> String {
    "futuro-worker".to_string()
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            thread_name: default_thread_name(),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerSection {
    /// `"propagate-skip"` (default) or `"proceed-regardless"`.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}
