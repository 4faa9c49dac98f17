/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use schedlab::analysis::Analyzer;
use schedlab::config::{Selection, TaskSetConfig};
use schedlab::scheduler::PriorityRule;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Simulate a periodic task set and run its schedulability tests.
///
/// Example:
///   schedlab --taskset demos/rm_classic.yaml --algorithm all
#[derive(Debug, Parser)]
#[command(
    name = "schedlab",
    about = "EDF / RM / DM schedulability analyzer",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML task-set file.
    #[arg(short = 't', long = "taskset")]
    taskset: PathBuf,

    /// Scheduling discipline: edf, rm, dm or all.  Overrides the file.
    #[arg(short = 'a', long = "algorithm")]
    algorithm: Option<Selection>,

    /// Simulation horizon in ticks.  Overrides the file; defaults to the hyperperiod.
    #[arg(long = "horizon")]
    horizon: Option<u64>,

    /// Largest hyperperiod or horizon accepted, in ticks.  Overrides the file.
    #[arg(long = "max-hyperperiod")]
    max_hyperperiod: Option<u64>,

    /// Omit the execution trace from the printed report.
    #[arg(long = "no-trace", default_value_t = false)]
    no_trace: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr so that stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        taskset   = %cli.taskset.display(),
        algorithm = ?cli.algorithm,
        horizon   = ?cli.horizon,
        no_trace  = cli.no_trace,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("Analysis failed: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = TaskSetConfig::load_from_file(&cli.taskset)?;

    if cli.horizon.is_some() {
        config.horizon = cli.horizon;
    }
    if let Some(limit) = cli.max_hyperperiod {
        config.max_hyperperiod = limit;
    }

    let selection = match cli.algorithm.or(config.selection) {
        Some(selection) => selection,
        None => {
            warn!("No algorithm given, defaulting to EDF");
            Selection::One(PriorityRule::EarliestDeadlineFirst)
        }
    };

    let analyzer = Analyzer::new(config.options());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for rule in selection.rules() {
        let mut report = analyzer
            .analyze_rule(&config.tasks, rule)
            .with_context(|| format!("{rule} analysis"))?;

        for result in &report.test_results {
            info!(
                discipline = %rule,
                test = %result.test,
                verdict = %result.verdict,
                "Test result"
            );
        }
        match &report.first_missed_deadline {
            Some(miss) => warn!(
                discipline = %rule,
                task_id = miss.task_id,
                round = miss.round,
                deadline = miss.deadline,
                "Simulation missed a deadline"
            ),
            None => info!(discipline = %rule, horizon = report.horizon, "No deadline missed"),
        }

        if cli.no_trace {
            report.trace.clear();
        }
        let yaml = serde_yaml::to_string(&report).context("Failed to serialise report")?;
        writeln!(out, "---\n{}", yaml.trim_end()).context("Failed to write report")?;
    }

    Ok(())
}
