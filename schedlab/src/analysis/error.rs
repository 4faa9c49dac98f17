/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type for the analysis orchestrator.
//!
//! Only input that makes an analysis impossible is an error here.  Rejected
//! tasks, inapplicable tests, indeterminate verdicts and deadline misses are
//! all reported inside [`AnalysisReport`](super::AnalysisReport).

use thiserror::Error;

use crate::feasibility::FeasibilityError;
use crate::hyperperiod::HyperperiodError;

/// Top-level failure returned by [`Analyzer::analyze()`](super::Analyzer::analyze).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// `analyze()` was called with an empty task list.
    #[error("no tasks provided, task list is empty")]
    NoTasks,

    /// Every candidate failed validation, leaving nothing to analyse.
    #[error("all {rejected} task(s) were rejected by validation")]
    NoValidTasks { rejected: usize },

    /// The discipline string is not recognised.
    #[error("unknown scheduling discipline: '{0}' (valid: edf, rm, dm)")]
    UnknownDiscipline(String),

    /// The hyperperiod overflowed or exceeded the configured budget.
    #[error("hyperperiod: {0}")]
    Hyperperiod(#[from] HyperperiodError),

    /// A schedulability test could not run.
    #[error("feasibility test: {0}")]
    Feasibility(#[from] FeasibilityError),
}
