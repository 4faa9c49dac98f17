/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Joseph & Pandya response-time analysis for fixed-priority rules.
//!
//! For each task `i` in priority order, starting from `R⁰ = C_i`:
//!
//! ```text
//! Rᵏ⁺¹ = C_i + Σ_{j ∈ hp(i)} ⌈Rᵏ / T_j⌉ · C_j
//! ```
//!
//! The sequence is non-decreasing.  It either reaches a fixed point
//! `Rᵏ⁺¹ = Rᵏ ≤ D_i` (the task is schedulable) or passes `D_i` (the whole set
//! fails and the remaining tasks are not evaluated).  Exact for DM with
//! `D ≤ T` and for RM with `D = T`; RM with `D < T` is analysed with period
//! ordering.

use tracing::{debug, info};

use super::{
    FeasibilityError, InterferenceTerm, Precondition, Step, TestKind, TestResult, Verdict,
};
use crate::scheduler::PriorityRule;
use crate::task::{Task, TaskId};

/// Run the response-time test for the fixed-priority `rule`.
///
/// EDF is reported as not applicable.
///
/// # Errors
/// [`FeasibilityError::NoTasks`] for an empty set.
pub fn response_time_test(
    tasks: &[Task],
    rule: PriorityRule,
) -> Result<TestResult, FeasibilityError> {
    if tasks.is_empty() {
        return Err(FeasibilityError::NoTasks);
    }

    let preconditions = match TestResult::gate(
        TestKind::ResponseTime,
        rule,
        tasks,
        &[
            Precondition::FixedPriorityRule,
            Precondition::IdenticalOffsets,
            Precondition::DeadlineWithinPeriod,
        ],
    ) {
        Ok(checks) => checks,
        Err(inapplicable) => return Ok(inapplicable),
    };

    let order = rule.priority_order(tasks);
    let mut steps = Vec::new();
    let mut verdict = Verdict::Pass;

    for (rank, &task_id) in order.iter().enumerate() {
        let higher = &order[..rank];
        if !analyse_task(tasks, task_id, higher, &mut steps) {
            verdict = Verdict::Fail;
            break;
        }
    }

    info!(%rule, task_count = tasks.len(), %verdict, "response-time test");

    Ok(TestResult {
        test: TestKind::ResponseTime,
        rule,
        preconditions,
        verdict,
        steps,
    })
}

/// Iterate task `task_id` to its fixed point against the `higher` priority
/// tasks.  Returns `false` once its response time exceeds its deadline.
fn analyse_task(
    tasks: &[Task],
    task_id: TaskId,
    higher: &[TaskId],
    steps: &mut Vec<Step>,
) -> bool {
    let task = &tasks[task_id];
    steps.push(Step::ResponseTimeStart {
        task_id,
        wcet: task.wcet,
        deadline: task.deadline,
    });

    let mut response_time = task.wcet;
    if response_time > task.deadline {
        steps.push(Step::ResponseTimeExceeded {
            task_id,
            response_time,
            deadline: task.deadline,
        });
        return false;
    }

    if higher.is_empty() {
        steps.push(Step::ResponseTimeConverged {
            task_id,
            response_time,
            deadline: task.deadline,
        });
        return true;
    }

    // Each non-converging iteration grows R by at least 1, so R passes the
    // deadline within `deadline + 1` iterations.
    let limit = task.deadline.saturating_add(1);
    for iteration in 1..=limit {
        let interference: Vec<InterferenceTerm> = higher
            .iter()
            .map(|&j| {
                let hp = &tasks[j];
                let releases = response_time.div_ceil(hp.period);
                InterferenceTerm {
                    task_id: j,
                    period: hp.period,
                    wcet: hp.wcet,
                    releases,
                    demand: releases.saturating_mul(hp.wcet),
                }
            })
            .collect();
        let next = interference
            .iter()
            .fold(task.wcet, |acc, term| acc.saturating_add(term.demand));

        debug!(task_id, iteration, previous = response_time, next, "response-time iteration");
        steps.push(Step::ResponseTimeIteration {
            task_id,
            iteration,
            previous: response_time,
            interference,
            response_time: next,
        });

        if next > task.deadline {
            steps.push(Step::ResponseTimeExceeded {
                task_id,
                response_time: next,
                deadline: task.deadline,
            });
            return false;
        }
        if next == response_time {
            steps.push(Step::ResponseTimeConverged {
                task_id,
                response_time,
                deadline: task.deadline,
            });
            return true;
        }
        response_time = next;
    }

    steps.push(Step::IterationLimit {
        task_id,
        iterations: limit,
    });
    false
}

// ── Tests ─────────────────────────────────────────────────────────────────────
