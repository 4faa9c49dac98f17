/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deadline-miss detection over a finished trace.
//!
//! A miss is a report, not an error: [`first_failed_deadline`] returns the
//! earliest violated absolute deadline, or `None`.

use std::collections::HashMap;

use serde::Serialize;

use super::{Job, RunningRecord};
use crate::task::{Task, TaskId};

/// How a job violated its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissKind {
    /// The job never ran.
    NeverRan,
    /// The job's last execution interval ended after its deadline.
    FinishedLate { finished_at: u64 },
    /// The job stopped running before its deadline without receiving its
    /// full WCET, and never ran again within the trace.
    Incomplete { executed: u64 },
}

/// The earliest deadline violation in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadlineMiss {
    pub task_id: TaskId,
    pub round: u64,
    /// Absolute deadline of the job.
    pub deadline: u64,
    #[serde(flatten)]
    pub kind: MissKind,
}

/// Find the earliest deadline miss in `trace`.
///
/// Every job whose absolute deadline is `≤` the trace's last end time is
/// checked.  It misses if it has no record, if its last record ends after
/// the deadline, or if its records add up to less than its WCET.  Among all
/// misses the one with the smallest absolute deadline is returned; ties go
/// to the lowest `task_id`, then the lowest round.
///
/// An empty trace has no misses.
pub fn first_failed_deadline(tasks: &[Task], trace: &[RunningRecord]) -> Option<DeadlineMiss> {
    let trace_end = trace.iter().map(|r| r.end_time).max()?;

    // job → (last end time, total executed)
    let mut runs: HashMap<Job, (u64, u64)> = HashMap::new();
    for record in trace {
        let entry = runs.entry(record.job()).or_insert((0, 0));
        entry.0 = entry.0.max(record.end_time);
        entry.1 += record.duration();
    }

    let mut first: Option<DeadlineMiss> = None;

    for (task_id, task) in tasks.iter().enumerate() {
        let mut round = 0;
        loop {
            let deadline = task.deadline_at(round);
            if deadline > trace_end {
                break;
            }
            // Rounds are checked in deadline order, so the first miss of a
            // task is its earliest.
            if let Some(kind) = check_job(task, runs.get(&Job { task_id, round }), deadline) {
                let earlier = first.map_or(true, |f| (deadline, task_id) < (f.deadline, f.task_id));
                if earlier {
                    first = Some(DeadlineMiss {
                        task_id,
                        round,
                        deadline,
                        kind,
                    });
                }
                break;
            }
            round += 1;
        }
    }

    first
}

fn check_job(task: &Task, run: Option<&(u64, u64)>, deadline: u64) -> Option<MissKind> {
    match run {
        None => Some(MissKind::NeverRan),
        Some(&(last_end, _)) if last_end > deadline => Some(MissKind::FinishedLate {
            finished_at: last_end,
        }),
        Some(&(_, executed)) if executed < task.wcet => Some(MissKind::Incomplete { executed }),
        Some(_) => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{simulate, PriorityRule};

    fn task(wcet: u64, deadline: u64, period: u64, offset: u64) -> Task {
        Task::new(wcet, deadline, period, offset).unwrap()
    }

    fn rec(task_id: TaskId, round: u64, start_time: u64, end_time: u64) -> RunningRecord {
        RunningRecord {
            task_id,
            round,
            start_time,
            end_time,
        }
    }

    #[test]
    fn schedulable_rm_set_has_no_miss() {
        let tasks = vec![task(1, 4, 4, 0), task(2, 6, 6, 0)];
        let trace = simulate(&tasks, 12, PriorityRule::RateMonotonic);
        assert_eq!(first_failed_deadline(&tasks, &trace), None);
    }

    #[test]
    fn empty_trace_has_no_miss() {
        assert_eq!(first_failed_deadline(&[task(1, 2, 2, 0)], &[]), None);
    }

    #[test]
    fn late_finish_is_reported() {
        let tasks = vec![task(2, 3, 5, 0)];
        let trace = vec![rec(0, 0, 2, 4)];
        assert_eq!(
            first_failed_deadline(&tasks, &trace),
            Some(DeadlineMiss {
                task_id: 0,
                round: 0,
                deadline: 3,
                kind: MissKind::FinishedLate { finished_at: 4 },
            })
        );
    }

    #[test]
    fn job_without_record_is_reported() {
        let tasks = vec![task(1, 2, 10, 0), task(1, 1, 1, 0)];
        // only task 1 ran; task 0's deadline 2 lies inside the trace
        let trace = vec![rec(1, 0, 0, 1), rec(1, 1, 1, 2), rec(1, 2, 2, 3)];
        let miss = first_failed_deadline(&tasks, &trace).unwrap();
        assert_eq!((miss.task_id, miss.round), (0, 0));
        assert_eq!(miss.kind, MissKind::NeverRan);
    }

    #[test]
    fn starved_partial_job_is_incomplete() {
        let tasks = vec![task(3, 4, 10, 0), task(1, 1, 1, 5)];
        // task 0 ran 1 tick and never resumed
        let trace = vec![rec(0, 0, 0, 1), rec(1, 0, 5, 6), rec(1, 1, 6, 7)];
        let miss = first_failed_deadline(&tasks, &trace).unwrap();
        assert_eq!(miss.task_id, 0);
        assert_eq!(miss.kind, MissKind::Incomplete { executed: 1 });
    }

    #[test]
    fn earliest_absolute_deadline_wins() {
        // Two misses: task 0 at deadline 6, task 1 at deadline 4
        let tasks = vec![task(1, 6, 10, 0), task(1, 4, 10, 0)];
        let trace = vec![rec(0, 0, 6, 7), rec(1, 0, 7, 8)];
        let miss = first_failed_deadline(&tasks, &trace).unwrap();
        assert_eq!(miss.task_id, 1);
        assert_eq!(miss.deadline, 4);
    }

    #[test]
    fn overloaded_edf_misses() {
        let tasks = vec![task(3, 4, 4, 0), task(3, 4, 4, 0)];
        let trace = simulate(&tasks, 8, PriorityRule::EarliestDeadlineFirst);
        let miss = first_failed_deadline(&tasks, &trace).unwrap();
        assert_eq!(miss.deadline, 4);
        assert_eq!(miss.task_id, 1);
    }

    #[test]
    fn deadline_equal_to_trace_end_is_checked() {
        // deadline 4 == trace end 4, job ran only 1 of 2 ticks
        let tasks = vec![task(2, 4, 4, 0)];
        let trace = vec![rec(0, 0, 3, 4)];
        let miss = first_failed_deadline(&tasks, &trace).unwrap();
        assert_eq!(miss.kind, MissKind::Incomplete { executed: 1 });
    }

    #[test]
    fn deadline_past_u64_is_beyond_trace() {
        let tasks = vec![task(1, 2, 2, 0), task(1, 2, 2, u64::MAX - 1)];
        let trace = simulate(&tasks, 4, PriorityRule::EarliestDeadlineFirst);
        assert_eq!(trace, vec![rec(0, 0, 0, 1), rec(0, 1, 2, 3)]);
        assert_eq!(first_failed_deadline(&tasks, &trace), None);
    }

    #[test]
    fn deadlines_beyond_trace_are_ignored() {
        let tasks = vec![task(1, 9, 10, 0)];
        let trace = vec![rec(0, 0, 0, 1)];
        assert_eq!(first_failed_deadline(&tasks, &trace), None);
    }
}
