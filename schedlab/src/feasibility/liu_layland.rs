/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Liu & Layland utilisation-bound test.
//!
//! EDF accepts an implicit-deadline synchronous set exactly when
//! `U = Σ C_i / T_i ≤ 1`.  RM (and DM, which coincides with RM once
//! `D = T`) accepts it when `U` stays under `n (2^(1/n) − 1)`.  Past that
//! bound but at or under `1.0` the answer is [`Verdict::Indeterminate`]:
//! the bound is sufficient only.
//!
//! Both checks require identical offsets and `D = T`; otherwise the result
//! is [`Verdict::NotApplicable`].

use std::cmp::Ordering;

use tracing::info;

use super::{FeasibilityError, Precondition, Step, TestKind, TestResult, Utilization, Verdict};
use crate::scheduler::PriorityRule;
use crate::task::Task;

/// RM utilisation ceiling for `n` tasks, `n (2^(1/n) − 1)`.
///
/// Falls from `1.0` at one task towards `ln 2`; an empty set gets `0.0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Run the utilisation-bound test for `rule`.
///
/// # Errors
/// [`FeasibilityError::NoTasks`] for an empty set;
/// [`FeasibilityError::Hyperperiod`] if the period LCM overflows.
pub fn liu_layland_test(
    tasks: &[Task],
    rule: PriorityRule,
) -> Result<TestResult, FeasibilityError> {
    if tasks.is_empty() {
        return Err(FeasibilityError::NoTasks);
    }

    let preconditions = match TestResult::gate(
        TestKind::LiuLayland,
        rule,
        tasks,
        &[
            Precondition::IdenticalOffsets,
            Precondition::DeadlineEqualsPeriod,
        ],
    ) {
        Ok(checks) => checks,
        Err(inapplicable) => return Ok(inapplicable),
    };

    let u = Utilization::of(tasks)?;
    let mut steps = vec![u.step(tasks)];

    let verdict = match rule {
        PriorityRule::EarliestDeadlineFirst => {
            let holds = u.cmp_one() != Ordering::Greater;
            steps.push(Step::BoundCheck {
                utilization: u.value(),
                bound: 1.0,
                holds,
            });
            if holds {
                Verdict::Pass
            } else {
                Verdict::Fail
            }
        }
        PriorityRule::RateMonotonic | PriorityRule::DeadlineMonotonic => {
            let bound = liu_layland_bound(tasks.len());
            let holds = u.value() <= bound;
            steps.push(Step::UtilizationBound {
                tasks: tasks.len(),
                bound,
            });
            steps.push(Step::BoundCheck {
                utilization: u.value(),
                bound,
                holds,
            });
            if holds {
                Verdict::Pass
            } else {
                Verdict::Indeterminate
            }
        }
    };

    info!(
        %rule,
        utilization = u.value(),
        %verdict,
        "Liu & Layland test"
    );

    Ok(TestResult {
        test: TestKind::LiuLayland,
        rule,
        preconditions,
        verdict,
        steps,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
