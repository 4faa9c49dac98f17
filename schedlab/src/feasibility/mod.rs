/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Analytic schedulability tests.
//!
//! Three independent tests, each of which states its preconditions, reaches
//! a [`Verdict`] and records the intermediate values it used as [`Step`]s:
//!
//! | Test | Module | Rules | Preconditions |
//! |---|---|---|---|
//! | Liu & Layland utilisation bound | [`liu_layland`] | EDF, RM | identical offsets, `D = T` |
//! | Joseph & Pandya response time | [`response_time`] | RM, DM | identical offsets, `D ≤ T` |
//! | Baruah, Rosier & Howell processor demand | [`processor_demand`] | EDF | identical offsets, `D ≤ T` |
//!
//! A test whose preconditions do not hold reports
//! [`Verdict::NotApplicable`] and records no steps.  Steps are structured
//! values for a presentation layer to render; nothing downstream computes
//! with them.

pub mod liu_layland;
pub mod processor_demand;
pub mod response_time;

pub use liu_layland::{liu_layland_bound, liu_layland_test};
pub use processor_demand::processor_demand_test;
pub use response_time::response_time_test;

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::hyperperiod::{periods_lcm, HyperperiodError};
use crate::scheduler::PriorityRule;
use crate::task::{self, Task, TaskId};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Input that no test can work with.
///
/// Inapplicable preconditions are **not** errors; they produce
/// [`Verdict::NotApplicable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeasibilityError {
    /// A test was called with an empty task set.
    #[error("schedulability tests need at least one task")]
    NoTasks,

    /// The LCM of the periods does not fit in `u64`.
    #[error(transparent)]
    Hyperperiod(#[from] HyperperiodError),
}

// ── Result types ──────────────────────────────────────────────────────────────

/// Which analytic test produced a [`TestResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    LiuLayland,
    ResponseTime,
    ProcessorDemand,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TestKind::LiuLayland => "Liu and Layland Test",
            TestKind::ResponseTime => "Joseph and Pandya Test",
            TestKind::ProcessorDemand => "Baruah, Rosier and Howell Test",
        };
        f.write_str(name)
    }
}

/// Outcome of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// A sufficient-only bound was exceeded; the set may still be schedulable.
    Indeterminate,
    NotApplicable,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verdict::Pass => "Passed",
            Verdict::Fail => "Failed",
            Verdict::Indeterminate => "Cannot Decide",
            Verdict::NotApplicable => "Not Applicable",
        };
        f.write_str(name)
    }
}

/// A structural requirement a test places on the task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// All tasks have identical offsets.
    IdenticalOffsets,
    /// Every task's deadline equals its period.
    DeadlineEqualsPeriod,
    /// No task's deadline exceeds its period.
    DeadlineWithinPeriod,
    /// The priority rule assigns fixed per-task priorities.
    FixedPriorityRule,
}

impl Precondition {
    pub fn check(self, tasks: &[Task], rule: PriorityRule) -> PreconditionCheck {
        let holds = match self {
            Precondition::IdenticalOffsets => task::identical_offsets(tasks),
            Precondition::DeadlineEqualsPeriod => task::deadlines_equal_periods(tasks),
            Precondition::DeadlineWithinPeriod => task::deadlines_within_periods(tasks),
            Precondition::FixedPriorityRule => rule.is_fixed_priority(),
        };
        PreconditionCheck {
            condition: self,
            holds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreconditionCheck {
    pub condition: Precondition,
    pub holds: bool,
}

/// Verdict, precondition checklist and derivation of one test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test: TestKind,
    pub rule: PriorityRule,
    pub preconditions: Vec<PreconditionCheck>,
    pub verdict: Verdict,
    pub steps: Vec<Step>,
}

impl TestResult {
    /// Evaluate `conditions` and return the inapplicable result if any fails.
    fn gate(
        test: TestKind,
        rule: PriorityRule,
        tasks: &[Task],
        conditions: &[Precondition],
    ) -> Result<Vec<PreconditionCheck>, TestResult> {
        let preconditions: Vec<PreconditionCheck> =
            conditions.iter().map(|c| c.check(tasks, rule)).collect();
        if preconditions.iter().all(|c| c.holds) {
            Ok(preconditions)
        } else {
            Err(TestResult {
                test,
                rule,
                preconditions,
                verdict: Verdict::NotApplicable,
                steps: Vec::new(),
            })
        }
    }

    pub fn is_applicable(&self) -> bool {
        self.verdict != Verdict::NotApplicable
    }
}

// ── Derivation steps ──────────────────────────────────────────────────────────

/// One intermediate value of a test's derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// `U = Σ C_i / T_i`
    Utilization {
        terms: Vec<UtilizationTerm>,
        total: f64,
    },
    /// `U_RM = n (2^(1/n) − 1)`
    UtilizationBound { tasks: usize, bound: f64 },
    /// `U ≤ bound`
    BoundCheck {
        utilization: f64,
        bound: f64,
        holds: bool,
    },

    /// `R^0 = C_i`
    ResponseTimeStart {
        task_id: TaskId,
        wcet: u64,
        deadline: u64,
    },
    /// `R^k = C_i + Σ_j ⌈R^(k−1) / T_j⌉ · C_j`
    ResponseTimeIteration {
        task_id: TaskId,
        iteration: u64,
        previous: u64,
        interference: Vec<InterferenceTerm>,
        response_time: u64,
    },
    /// Fixed point reached within the deadline.
    ResponseTimeConverged {
        task_id: TaskId,
        response_time: u64,
        deadline: u64,
    },
    /// `R^k > D_i`
    ResponseTimeExceeded {
        task_id: TaskId,
        response_time: u64,
        deadline: u64,
    },
    /// The iteration cap was hit before convergence.
    IterationLimit { task_id: TaskId, iterations: u64 },

    /// `L_LCM = LCM{T_i}`
    LcmHorizon { periods: Vec<u64>, lcm: u64 },
    /// `U ≥ 1` ⇒ `L_max = L_LCM`
    SaturatedHorizon { l_max: u64 },
    /// `L* = ⌈Σ (T_i − D_i) U_i / (1 − U)⌉`
    BusyPeriodBound {
        weighted_slack: f64,
        spare_capacity: f64,
        l_star: u64,
    },
    /// `L_BRH = max{D_1 … D_n, L*}`
    BrhHorizon {
        max_deadline: u64,
        l_star: u64,
        l_brh: u64,
    },
    /// `L_max = min{L_LCM, L_BRH}`
    CheckHorizon { l_lcm: u64, l_brh: u64, l_max: u64 },
    /// `K_i = {k T_i + D_i ≤ L_max}`
    TaskCheckpoints {
        task_id: TaskId,
        checkpoints: Vec<u64>,
    },
    /// `K = ∪ K_i`, sorted and deduplicated.
    Checkpoints { checkpoints: Vec<u64> },
    /// `C_P(0, L) = Σ (⌊(L − D_i) / T_i⌋ + 1) · C_i ≤ L`
    ProcessorDemand {
        l: u64,
        terms: Vec<DemandTerm>,
        total: u64,
        holds: bool,
    },
    /// First checkpoint where demand exceeded supply.
    DemandExceeded { l: u64, demand: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtilizationTerm {
    pub task_id: TaskId,
    pub wcet: u64,
    pub period: u64,
}

/// `⌈R / T_j⌉ · C_j` for one higher-priority task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterferenceTerm {
    pub task_id: TaskId,
    pub period: u64,
    pub wcet: u64,
    pub releases: u64,
    pub demand: u64,
}

/// `(⌊(L − D_i) / T_i⌋ + 1) · C_i` for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandTerm {
    pub task_id: TaskId,
    pub instances: u64,
    pub wcet: u64,
    pub demand: u64,
}

// ── Utilization ───────────────────────────────────────────────────────────────

/// Exact total utilisation `U = demand / window`, where `window` is the LCM
/// of the periods and `demand = Σ C_i · (window / T_i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utilization {
    pub demand: u128,
    pub window: u128,
}

impl Utilization {
    /// # Errors
    /// [`FeasibilityError::NoTasks`] for an empty set, or
    /// [`FeasibilityError::Hyperperiod`] if the period LCM overflows.
    pub fn of(tasks: &[Task]) -> Result<Self, FeasibilityError> {
        if tasks.is_empty() {
            return Err(FeasibilityError::NoTasks);
        }
        let window = u128::from(periods_lcm(tasks)?);
        let demand = tasks
            .iter()
            .map(|t| u128::from(t.wcet) * (window / u128::from(t.period)))
            .fold(0u128, u128::saturating_add);
        Ok(Self { demand, window })
    }

    pub fn value(&self) -> f64 {
        self.demand as f64 / self.window as f64
    }

    /// Compare `U` with `1` exactly.
    pub fn cmp_one(&self) -> Ordering {
        self.demand.cmp(&self.window)
    }

    /// The [`Step::Utilization`] derivation for `tasks`.
    pub fn step(&self, tasks: &[Task]) -> Step {
        Step::Utilization {
            terms: tasks
                .iter()
                .enumerate()
                .map(|(task_id, t)| UtilizationTerm {
                    task_id,
                    wcet: t.wcet,
                    period: t.period,
                })
                .collect(),
            total: self.value(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn task(wcet: u64, deadline: u64, period: u64, offset: u64) -> Task {
        Task::new(wcet, deadline, period, offset).unwrap()
    }

    #[test]
    fn utilization_is_exact() {
        // 1/3 + 1/3 + 1/3 == 1 exactly
        let tasks = vec![task(1, 3, 3, 0); 3];
        let u = Utilization::of(&tasks).unwrap();
        assert_eq!(u.cmp_one(), Ordering::Equal);
        assert_eq!(u.value(), 1.0);
    }

    #[test]
    fn utilization_of_classic_rm_pair() {
        let tasks = vec![task(1, 4, 4, 0), task(2, 6, 6, 0)];
        let u = Utilization::of(&tasks).unwrap();
        assert_eq!(u.window, 12);
        assert_eq!(u.demand, 3 + 4);
        assert!((u.value() - 7.0 / 12.0).abs() < 1e-12);
        assert_eq!(u.cmp_one(), Ordering::Less);
    }

    #[test]
    fn utilization_of_empty_set_is_an_error() {
        assert_eq!(Utilization::of(&[]), Err(FeasibilityError::NoTasks));
    }

    #[test]
    fn gate_reports_every_precondition() {
        let tasks = vec![task(1, 4, 4, 0), task(1, 3, 6, 1)];
        let result = TestResult::gate(
            TestKind::LiuLayland,
            PriorityRule::RateMonotonic,
            &tasks,
            &[Precondition::IdenticalOffsets, Precondition::DeadlineEqualsPeriod],
        )
        .unwrap_err();
        assert_eq!(result.verdict, Verdict::NotApplicable);
        assert!(!result.is_applicable());
        assert!(result.steps.is_empty());
        assert_eq!(result.preconditions.len(), 2);
        assert!(result.preconditions.iter().all(|c| !c.holds));
    }

    #[test]
    fn fixed_priority_precondition_follows_rule() {
        let tasks = vec![task(1, 4, 4, 0)];
        assert!(Precondition::FixedPriorityRule
            .check(&tasks, PriorityRule::DeadlineMonotonic)
            .holds);
        assert!(!Precondition::FixedPriorityRule
            .check(&tasks, PriorityRule::EarliestDeadlineFirst)
            .holds);
    }

    #[test]
    fn verdict_display_names() {
        assert_eq!(Verdict::Pass.to_string(), "Passed");
        assert_eq!(Verdict::Indeterminate.to_string(), "Cannot Decide");
        assert_eq!(Verdict::NotApplicable.to_string(), "Not Applicable");
    }
}
