/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic task model.
//!
//! Two types model the two sides of validation:
//!
//! ```text
//! task-set file / caller  ──►  TaskCandidate  ──(validate)──►  Task  ──►  simulator + tests
//!                              every field optional              immutable, wcet ≤ deadline
//! ```
//!
//! # Identity
//! A `Task` carries no identifier.  Its position in the task slice handed to
//! the simulator and the feasibility tests is its [`TaskId`], and every
//! [`RunningRecord`](crate::scheduler::RunningRecord) or derivation step refers
//! back to that position.

use serde::{Deserialize, Serialize};

/// Positional identity of a task inside one task set.
pub type TaskId = usize;

// ── Task ──────────────────────────────────────────────────────────────────────

/// A validated periodic task.
///
/// The k-th release ("round" k, zero-based) happens at
/// `offset + k·period` and must complete by `offset + deadline + k·period`.
/// Rounds are never materialised; they are derived on demand with
/// [`release_at`](Self::release_at) and [`deadline_at`](Self::deadline_at).
///
/// Construct through [`validate`] so that `wcet ≤ deadline` and the positive
/// fields are guaranteed.  The fields stay public for read access and for
/// test fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Worst-case execution time.
    pub wcet: u64,
    /// Relative deadline.
    pub deadline: u64,
    /// Release period.
    pub period: u64,
    /// Time of the first release.
    pub offset: u64,
}

impl Task {
    /// Validate and build a task in one step.
    pub fn new(wcet: u64, deadline: u64, period: u64, offset: u64) -> Result<Self, TaskRejection> {
        validate(&TaskCandidate::complete(wcet, deadline, period, offset))
    }

    /// Release time of `round`, saturating at `u64::MAX`.
    ///
    /// A saturated time lies past any horizon, so such a round is never
    /// released or checked.
    pub fn release_at(&self, round: u64) -> u64 {
        self.offset.saturating_add(self.period.saturating_mul(round))
    }

    /// Absolute deadline of `round`, saturating at `u64::MAX`.
    pub fn deadline_at(&self, round: u64) -> u64 {
        self.release_at(round).saturating_add(self.deadline)
    }

    /// Utilisation fraction `wcet / period` as a float, for display.
    ///
    /// Decisions that must be exact use
    /// [`Utilization`](crate::feasibility::Utilization) instead.
    pub fn utilization(&self) -> f64 {
        self.wcet as f64 / self.period as f64
    }
}

// ── TaskCandidate ─────────────────────────────────────────────────────────────

/// A task as supplied by the caller, before validation.
///
/// Every field is optional so that a missing value can be reported as a
/// [`TaskRejection`] instead of failing the whole task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub wcet: Option<u64>,
    pub deadline: Option<u64>,
    pub period: Option<u64>,
    pub offset: Option<u64>,
}

impl TaskCandidate {
    /// Candidate with every field present.
    pub fn complete(wcet: u64, deadline: u64, period: u64, offset: u64) -> Self {
        Self {
            wcet: Some(wcet),
            deadline: Some(deadline),
            period: Some(period),
            offset: Some(offset),
        }
    }
}

impl From<Task> for TaskCandidate {
    fn from(task: Task) -> Self {
        Self::complete(task.wcet, task.deadline, task.period, task.offset)
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Name of a task parameter, used in rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Wcet,
    Deadline,
    Period,
    Offset,
}

impl std::fmt::Display for TaskField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskField::Wcet => "wcet",
            TaskField::Deadline => "deadline",
            TaskField::Period => "period",
            TaskField::Offset => "offset",
        };
        f.write_str(name)
    }
}

/// Why a [`TaskCandidate`] was rejected by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TaskRejection {
    /// A required field has no value.
    MissingField { field: TaskField },

    /// `wcet`, `deadline` and `period` must be strictly positive.
    NotPositive { field: TaskField },

    /// The task cannot finish before its own deadline even when it runs
    /// uninterrupted.
    WcetExceedsDeadline { wcet: u64, deadline: u64 },
}

impl std::fmt::Display for TaskRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskRejection::MissingField { field } => write!(f, "field '{}' is missing", field),

            TaskRejection::NotPositive { field } => {
                write!(f, "field '{}' must be a positive integer", field)
            }

            TaskRejection::WcetExceedsDeadline { wcet, deadline } => write!(
                f,
                "wcet {} exceeds relative deadline {}",
                wcet, deadline
            ),
        }
    }
}

impl std::error::Error for TaskRejection {}

/// Validate a candidate.
///
/// Rejects a missing field, a zero `wcet` / `deadline` / `period`, or
/// `wcet > deadline`.  Nothing else is checked here: `deadline > period` or
/// mixed offsets are legal and are handled by the feasibility tests as "not
/// applicable".
pub fn validate(candidate: &TaskCandidate) -> Result<Task, TaskRejection> {
    let require = |value: Option<u64>, field: TaskField| {
        value.ok_or(TaskRejection::MissingField { field })
    };
    let positive = |value: u64, field: TaskField| {
        if value == 0 {
            Err(TaskRejection::NotPositive { field })
        } else {
            Ok(value)
        }
    };

    let wcet = positive(require(candidate.wcet, TaskField::Wcet)?, TaskField::Wcet)?;
    let deadline = positive(
        require(candidate.deadline, TaskField::Deadline)?,
        TaskField::Deadline,
    )?;
    let period = positive(require(candidate.period, TaskField::Period)?, TaskField::Period)?;
    let offset = require(candidate.offset, TaskField::Offset)?;

    if wcet > deadline {
        return Err(TaskRejection::WcetExceedsDeadline { wcet, deadline });
    }

    Ok(Task {
        wcet,
        deadline,
        period,
        offset,
    })
}

// ── Task-set predicates ───────────────────────────────────────────────────────

/// `true` when every task shares the first task's offset (vacuously true for
/// an empty set).
pub fn identical_offsets(tasks: &[Task]) -> bool {
    tasks.windows(2).all(|w| w[0].offset == w[1].offset)
}

/// `true` when `deadline == period` for every task.
pub fn deadlines_equal_periods(tasks: &[Task]) -> bool {
    tasks.iter().all(|t| t.deadline == t.period)
}

/// `true` when `deadline ≤ period` for every task.
pub fn deadlines_within_periods(tasks: &[Task]) -> bool {
    tasks.iter().all(|t| t.deadline <= t.period)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn valid_candidate_becomes_task() {
        let task = validate(&TaskCandidate::complete(2, 5, 10, 1)).unwrap();
        assert_eq!(
            task,
            Task {
                wcet: 2,
                deadline: 5,
                period: 10,
                offset: 1
            }
        );
    }

    #[test]
    fn wcet_equal_to_deadline_is_accepted() {
        assert!(Task::new(3, 3, 3, 0).is_ok());
    }

    #[test]
    fn wcet_above_deadline_is_rejected() {
        let err = Task::new(4, 3, 10, 0).unwrap_err();
        assert_eq!(
            err,
            TaskRejection::WcetExceedsDeadline {
                wcet: 4,
                deadline: 3
            }
        );
    }

    #[test]
    fn deadline_above_period_is_accepted() {
        // constrained-deadline checks belong to the feasibility tests
        assert!(Task::new(1, 20, 10, 0).is_ok());
    }

    #[test]
    fn each_missing_field_is_reported() {
        let full = TaskCandidate::complete(1, 2, 3, 0);
        let cases = [
            (TaskCandidate { wcet: None, ..full }, TaskField::Wcet),
            (TaskCandidate { deadline: None, ..full }, TaskField::Deadline),
            (TaskCandidate { period: None, ..full }, TaskField::Period),
            (TaskCandidate { offset: None, ..full }, TaskField::Offset),
        ];
        for (candidate, field) in cases {
            assert_eq!(
                validate(&candidate).unwrap_err(),
                TaskRejection::MissingField { field }
            );
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = Task::new(1, 2, 0, 0).unwrap_err();
        assert_eq!(
            err,
            TaskRejection::NotPositive {
                field: TaskField::Period
            }
        );
    }

    #[test]
    fn zero_offset_is_fine() {
        assert_eq!(Task::new(1, 2, 3, 0).unwrap().offset, 0);
    }

    #[test]
    fn rejection_messages_name_the_problem() {
        let msg = TaskRejection::WcetExceedsDeadline {
            wcet: 7,
            deadline: 5,
        }
        .to_string();
        assert!(msg.contains('7') && msg.contains('5'), "got: {msg}");

        let msg = TaskRejection::MissingField {
            field: TaskField::Offset,
        }
        .to_string();
        assert!(msg.contains("offset"), "got: {msg}");
    }

    // ── rounds ────────────────────────────────────────────────────────────────

    #[test]
    fn release_and_deadline_follow_round() {
        let t = Task::new(1, 3, 5, 2).unwrap();
        assert_eq!(t.release_at(0), 2);
        assert_eq!(t.deadline_at(0), 5);
        assert_eq!(t.release_at(3), 17);
        assert_eq!(t.deadline_at(3), 20);
    }

    #[test]
    fn times_past_u64_saturate() {
        let t = Task::new(1, 2, 2, u64::MAX - 1).unwrap();
        assert_eq!(t.release_at(0), u64::MAX - 1);
        assert_eq!(t.deadline_at(0), u64::MAX);
        assert_eq!(t.release_at(5), u64::MAX);
        assert_eq!(Task::new(1, 2, u64::MAX, 0).unwrap().deadline_at(3), u64::MAX);
    }

    #[test]
    fn utilization_is_wcet_over_period() {
        let t = Task::new(1, 4, 4, 0).unwrap();
        assert!((t.utilization() - 0.25).abs() < 1e-12);
    }

    // ── task-set predicates ───────────────────────────────────────────────────

    #[test]
    fn predicates_on_mixed_set() {
        let a = Task::new(1, 4, 4, 0).unwrap();
        let b = Task::new(1, 3, 6, 0).unwrap();
        let c = Task::new(1, 3, 6, 2).unwrap();

        assert!(identical_offsets(&[a, b]));
        assert!(!identical_offsets(&[a, b, c]));
        assert!(deadlines_equal_periods(&[a]));
        assert!(!deadlines_equal_periods(&[a, b]));
        assert!(deadlines_within_periods(&[a, b, c]));
        assert!(identical_offsets(&[]));
    }
}
