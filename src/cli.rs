// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::FailurePolicy;

/// Command-line arguments for the `futuro` demo binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "futuro",
    version,
    about = "Run built-in dependency-graph and forwarding-handle scenarios.",
    long_about = None
)]
pub struct CliArgs {
    /// Scenario to run.
    #[arg(value_enum, default_value = "diamond")]
    pub scenario: Scenario,

    /// Path to a config file (TOML).
    ///
    /// Default: `$FUTURO_CONFIG`, then `Futuro.toml` if it exists. Built-in
    /// defaults are used when neither is present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of worker threads (overrides `[pool].workers`).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Failure policy (overrides `[scheduler].failure_policy`).
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<FailurePolicy>,

    /// Length of one unit of simulated work, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub scale_ms: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FUTURO_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Build the scenario graph and print its topological order without
    /// running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Built-in scenarios.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// f1 -> {f2, f3} -> f4, with f2 ten times slower than the rest.
    Diamond,
    /// f1 -> {f2, f3}, f3 -> f4: f4 does not wait for the slow f2.
    Chain,
    /// Three roots summed by a single dependent.
    FanIn,
    /// A failing root with dependents, next to an independent branch.
    Failing,
    /// Arithmetic on forwarding handles straight from the pool.
    Forwarding,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
