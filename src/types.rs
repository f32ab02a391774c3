// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What the scheduler does with the dependents of a task that failed.
///
/// - `PropagateSkip`: every transitive dependent of the failed task is marked
///   skipped and never submitted (default behaviour).
/// - `ProceedRegardless`: a dependent is submitted once all of its
///   dependencies are terminal, failed or not. The failure only surfaces when
///   the dependent reads the dependency's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[serde(alias = "skip")]
    PropagateSkip,
    #[serde(alias = "proceed")]
    ProceedRegardless,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::PropagateSkip
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate-skip" | "skip" => Ok(FailurePolicy::PropagateSkip),
            "proceed-regardless" | "proceed" => Ok(FailurePolicy::ProceedRegardless),
            other => Err(format!(
                "invalid failure_policy: {other} (expected \"propagate-skip\" or \"proceed-regardless\")"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::PropagateSkip => f.write_str("propagate-skip"),
            FailurePolicy::ProceedRegardless => f.write_str("proceed-regardless"),
        }
    }
}
