/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Analysis orchestrator.
//!
//! [`Analyzer`] takes raw [`TaskCandidate`]s and a discipline, and runs the
//! whole pipeline:
//!
//! ```text
//! candidates ─► validate ─► hyperperiod ─► simulate ─► first_failed_deadline
//!                  │                           │
//!                  └─► rejected               └─► discipline's analytic tests
//! ```
//!
//! | Discipline | Tests |
//! |---|---|
//! | EDF | Liu & Layland (`U ≤ 1`), processor demand |
//! | RM | Liu & Layland (`n(2^(1/n) − 1)`), response time by period |
//! | DM | response time by deadline |
//!
//! The analyzer holds only its options.  Every call allocates its own state
//! and is a pure function of its inputs.
//!
//! # Example
//! ```rust
//! use schedlab::analysis::Analyzer;
//! use schedlab::task::TaskCandidate;
//!
//! let tasks = [TaskCandidate::complete(1, 4, 4, 0), TaskCandidate::complete(2, 6, 6, 0)];
//! let report = Analyzer::default().analyze(&tasks, "rm").unwrap();
//! assert!(report.schedulable());
//! assert_eq!(report.horizon, 12);
//! ```

pub mod error;

pub use error::AnalysisError;

use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use crate::feasibility::{
    liu_layland_test, processor_demand_test, response_time_test, TestKind, TestResult,
};
use crate::hyperperiod::{
    calculate_hyperperiod, HyperperiodError, HyperperiodInfo, DEFAULT_HYPERPERIOD_LIMIT,
};
use crate::scheduler::{
    first_failed_deadline, simulate, DeadlineMiss, PriorityRule, RunningRecord,
};
use crate::task::{validate, Task, TaskCandidate, TaskRejection};

// ── Discipline parsing ────────────────────────────────────────────────────────

impl FromStr for PriorityRule {
    type Err = AnalysisError;

    /// Case-insensitive `edf`, `rm` or `dm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edf" => Ok(PriorityRule::EarliestDeadlineFirst),
            "rm" => Ok(PriorityRule::RateMonotonic),
            "dm" => Ok(PriorityRule::DeadlineMonotonic),
            _ => Err(AnalysisError::UnknownDiscipline(s.to_string())),
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Caller-side resource budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Simulation horizon.  `None` simulates one hyperperiod.
    pub horizon: Option<u64>,
    /// Largest hyperperiod, or explicit horizon, accepted.
    pub hyperperiod_limit: u64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            horizon: None,
            hyperperiod_limit: DEFAULT_HYPERPERIOD_LIMIT,
        }
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// A candidate that failed validation, with its position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RejectedTask {
    pub index: usize,
    pub reason: TaskRejection,
}

/// Everything one analysis run produced.
///
/// Task ids in `trace`, `first_missed_deadline` and `test_results` are
/// positions in `tasks`, the validated subset of the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub discipline: PriorityRule,
    pub tasks: Vec<Task>,
    pub rejected: Vec<RejectedTask>,
    pub hyperperiod: HyperperiodInfo,
    /// Simulated window `[0, horizon)`.
    pub horizon: u64,
    pub trace: Vec<RunningRecord>,
    pub first_missed_deadline: Option<DeadlineMiss>,
    pub test_results: Vec<TestResult>,
}

impl AnalysisReport {
    /// `true` when the simulation met every deadline inside the horizon.
    pub fn schedulable(&self) -> bool {
        self.first_missed_deadline.is_none()
    }

    /// The result of `kind`, if this discipline runs it.
    pub fn test(&self, kind: TestKind) -> Option<&TestResult> {
        self.test_results.iter().find(|r| r.test == kind)
    }
}

// ── Analyzer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
}

impl Analyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Analyse `candidates` under the discipline named `discipline`
    /// (`edf`, `rm` or `dm`).
    ///
    /// # Errors
    /// [`AnalysisError::UnknownDiscipline`] for an unrecognised name, plus
    /// everything [`analyze_rule`](Self::analyze_rule) returns.
    pub fn analyze(
        &self,
        candidates: &[TaskCandidate],
        discipline: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_rule(candidates, discipline.parse()?)
    }

    /// Validate `candidates`, simulate them under `rule` and run the rule's
    /// analytic tests.
    ///
    /// Invalid candidates are excluded and listed in
    /// [`AnalysisReport::rejected`].
    ///
    /// # Errors
    /// * [`AnalysisError::NoTasks`] – `candidates` is empty.
    /// * [`AnalysisError::NoValidTasks`] – every candidate was rejected.
    /// * [`AnalysisError::Hyperperiod`] – the hyperperiod overflows, or the
    ///   horizon exceeds the configured limit.
    pub fn analyze_rule(
        &self,
        candidates: &[TaskCandidate],
        rule: PriorityRule,
    ) -> Result<AnalysisReport, AnalysisError> {
        if candidates.is_empty() {
            return Err(AnalysisError::NoTasks);
        }

        info!(
            discipline = %rule,
            candidate_count = candidates.len(),
            "=== Analyzer::analyze() ==="
        );

        let mut tasks = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            match validate(candidate) {
                Ok(task) => tasks.push(task),
                Err(reason) => {
                    warn!(index, %reason, "Task rejected by validation");
                    rejected.push(RejectedTask { index, reason });
                }
            }
        }
        if tasks.is_empty() {
            return Err(AnalysisError::NoValidTasks {
                rejected: rejected.len(),
            });
        }

        let mut report = self.analyze_tasks(&tasks, rule)?;
        report.rejected = rejected;
        Ok(report)
    }

    /// Run the pipeline on already-validated tasks.
    ///
    /// # Errors
    /// [`AnalysisError::NoTasks`] for an empty slice and
    /// [`AnalysisError::Hyperperiod`] as for
    /// [`analyze_rule`](Self::analyze_rule).
    pub fn analyze_tasks(
        &self,
        tasks: &[Task],
        rule: PriorityRule,
    ) -> Result<AnalysisReport, AnalysisError> {
        if tasks.is_empty() {
            return Err(AnalysisError::NoTasks);
        }

        let limit = self.options.hyperperiod_limit;
        let (hyperperiod, horizon) = match self.options.horizon {
            Some(horizon) => {
                if horizon > limit {
                    warn!(horizon, limit, "Explicit horizon exceeds configured limit");
                    return Err(HyperperiodError::TooLarge {
                        value: horizon,
                        limit,
                    }
                    .into());
                }
                // The horizon bounds the simulation; the hyperperiod only has to fit.
                (calculate_hyperperiod(tasks, u64::MAX)?, horizon)
            }
            None => {
                let info = calculate_hyperperiod(tasks, limit)?;
                let horizon = info.hyperperiod;
                (info, horizon)
            }
        };

        let trace = simulate(tasks, horizon, rule);
        let first_missed_deadline = first_failed_deadline(tasks, &trace);
        if let Some(miss) = &first_missed_deadline {
            info!(
                task_id = miss.task_id,
                round = miss.round,
                deadline = miss.deadline,
                "Deadline missed in simulation"
            );
        }

        let test_results = match rule {
            PriorityRule::EarliestDeadlineFirst => {
                vec![liu_layland_test(tasks, rule)?, processor_demand_test(tasks, limit)?]
            }
            PriorityRule::RateMonotonic => {
                vec![liu_layland_test(tasks, rule)?, response_time_test(tasks, rule)?]
            }
            PriorityRule::DeadlineMonotonic => vec![response_time_test(tasks, rule)?],
        };

        info!(
            discipline = %rule,
            task_count = tasks.len(),
            horizon,
            records = trace.len(),
            schedulable = first_missed_deadline.is_none(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            discipline: rule,
            tasks: tasks.to_vec(),
            rejected: Vec::new(),
            hyperperiod,
            horizon,
            trace,
            first_missed_deadline,
            test_results,
        })
    }
}

/// Analyse `candidates` under `rule` with the default options.
pub fn analyze(
    candidates: &[TaskCandidate],
    rule: PriorityRule,
) -> Result<AnalysisReport, AnalysisError> {
    Analyzer::default().analyze_rule(candidates, rule)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
