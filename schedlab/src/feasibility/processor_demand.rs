/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Baruah, Rosier & Howell processor-demand test for EDF.
//!
//! A synchronous set with `D ≤ T` is EDF-schedulable iff, for every absolute
//! deadline `L` up to a check horizon `L_max`,
//!
//! ```text
//! C_P(0, L) = Σ_{D_i ≤ L} (⌊(L − D_i) / T_i⌋ + 1) · C_i ≤ L
//! ```
//!
//! The horizon is the hyperperiod when `U ≥ 1`, and otherwise the smaller of
//! the hyperperiod and the busy-period bound
//! `L_BRH = max(D_max, ⌈Σ (T_i − D_i) U_i / (1 − U)⌉)`.
//!
//! `U` and `L*` are evaluated exactly over the hyperperiod `H`:
//! `L* = ⌈Σ (T_i − D_i) · C_i · (H / T_i) / (H − Σ C_i · (H / T_i))⌉`.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use super::{
    DemandTerm, FeasibilityError, Precondition, Step, TestKind, TestResult, Utilization, Verdict,
};
use crate::hyperperiod::{periods_lcm, HyperperiodError};
use crate::scheduler::PriorityRule;
use crate::task::Task;

/// Run the processor-demand test.  The rule is always EDF.
///
/// `limit` caps the check horizon `L_max`, and with it the number of
/// checkpoints tabulated.
///
/// # Errors
/// * [`FeasibilityError::NoTasks`] for an empty set.
/// * [`FeasibilityError::Hyperperiod`] if the period LCM overflows, or
///   `L_max` exceeds `limit` ([`HyperperiodError::TooLarge`]).
pub fn processor_demand_test(tasks: &[Task], limit: u64) -> Result<TestResult, FeasibilityError> {
    let rule = PriorityRule::EarliestDeadlineFirst;
    if tasks.is_empty() {
        return Err(FeasibilityError::NoTasks);
    }

    let preconditions = match TestResult::gate(
        TestKind::ProcessorDemand,
        rule,
        tasks,
        &[
            Precondition::IdenticalOffsets,
            Precondition::DeadlineWithinPeriod,
        ],
    ) {
        Ok(checks) => checks,
        Err(inapplicable) => return Ok(inapplicable),
    };

    let u = Utilization::of(tasks)?;
    let l_lcm = periods_lcm(tasks)?;
    let mut steps = vec![
        u.step(tasks),
        Step::LcmHorizon {
            periods: tasks.iter().map(|t| t.period).collect(),
            lcm: l_lcm,
        },
    ];

    let l_max = check_horizon(tasks, &u, l_lcm, &mut steps);
    debug!(l_lcm, l_max, "processor-demand horizon");
    if l_max > limit {
        warn!(l_max, limit, "Processor-demand horizon exceeds configured limit");
        return Err(HyperperiodError::TooLarge {
            value: l_max,
            limit,
        }
        .into());
    }

    let mut merged = Vec::new();
    for (task_id, task) in tasks.iter().enumerate() {
        let own = task_checkpoints(task, l_max);
        merged.extend_from_slice(&own);
        steps.push(Step::TaskCheckpoints {
            task_id,
            checkpoints: own,
        });
    }
    merged.sort_unstable();
    merged.dedup();
    steps.push(Step::Checkpoints {
        checkpoints: merged.clone(),
    });

    let mut first_violation: Option<(u64, u64)> = None;
    for &l in &merged {
        let terms = demand_terms(tasks, l);
        let total = terms
            .iter()
            .fold(0u64, |acc, term| acc.saturating_add(term.demand));
        let holds = total <= l;
        if !holds && first_violation.is_none() {
            first_violation = Some((l, total));
        }
        steps.push(Step::ProcessorDemand {
            l,
            terms,
            total,
            holds,
        });
    }

    let verdict = match first_violation {
        Some((l, demand)) => {
            steps.push(Step::DemandExceeded { l, demand });
            Verdict::Fail
        }
        None => Verdict::Pass,
    };

    info!(
        utilization = u.value(),
        l_max,
        checkpoints = merged.len(),
        %verdict,
        "processor-demand test"
    );

    Ok(TestResult {
        test: TestKind::ProcessorDemand,
        rule,
        preconditions,
        verdict,
        steps,
    })
}

/// Sorted, deduplicated absolute deadlines `k·T_i + D_i ≤ horizon` of all
/// tasks released at time 0.
pub fn checkpoints(tasks: &[Task], horizon: u64) -> Vec<u64> {
    let mut all: Vec<u64> = tasks
        .iter()
        .flat_map(|t| task_checkpoints(t, horizon))
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

/// `C_P(0, L)`: the execution demanded by jobs with deadline `≤ l`.
pub fn demand(tasks: &[Task], l: u64) -> u64 {
    demand_terms(tasks, l)
        .iter()
        .fold(0u64, |acc, term| acc.saturating_add(term.demand))
}

fn check_horizon(tasks: &[Task], u: &Utilization, l_lcm: u64, steps: &mut Vec<Step>) -> u64 {
    if u.cmp_one() != Ordering::Less {
        steps.push(Step::SaturatedHorizon { l_max: l_lcm });
        return l_lcm;
    }

    let window = u.window;
    let slack: u128 = tasks
        .iter()
        .map(|t| {
            u128::from(t.period - t.deadline)
                .saturating_mul(u128::from(t.wcet))
                .saturating_mul(window / u128::from(t.period))
        })
        .fold(0u128, u128::saturating_add);
    // U < 1 so the denominator is positive.
    let l_star = u64::try_from(slack.div_ceil(window - u.demand)).unwrap_or(u64::MAX);

    let weighted_slack: f64 = tasks
        .iter()
        .map(|t| (t.period - t.deadline) as f64 * t.utilization())
        .sum();
    steps.push(Step::BusyPeriodBound {
        weighted_slack,
        spare_capacity: 1.0 - u.value(),
        l_star,
    });

    let max_deadline = tasks.iter().map(|t| t.deadline).max().unwrap_or(0);
    let l_brh = l_star.max(max_deadline);
    steps.push(Step::BrhHorizon {
        max_deadline,
        l_star,
        l_brh,
    });

    let l_max = l_lcm.min(l_brh);
    steps.push(Step::CheckHorizon {
        l_lcm,
        l_brh,
        l_max,
    });
    l_max
}

fn task_checkpoints(task: &Task, horizon: u64) -> Vec<u64> {
    std::iter::successors(Some(task.deadline), |d| d.checked_add(task.period))
        .take_while(|&d| d <= horizon)
        .collect()
}

/// Per-task demand at `l`.  Tasks whose first deadline lies after `l`
/// contribute nothing and are omitted.
fn demand_terms(tasks: &[Task], l: u64) -> Vec<DemandTerm> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.deadline <= l)
        .map(|(task_id, t)| {
            let instances = (l - t.deadline) / t.period + 1;
            DemandTerm {
                task_id,
                instances,
                wcet: t.wcet,
                demand: instances.saturating_mul(t.wcet),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
