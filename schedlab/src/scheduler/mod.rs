/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Discrete-time preemptive uniprocessor simulator.
//!
//! [`simulate`] advances time in unit ticks over `[0, horizon)`.  At every tick
//! it collects the ready jobs, lets a [`PriorityRule`] pick one, runs it for
//! one tick and appends the tick to the trace, coalescing it into the previous
//! [`RunningRecord`] when the same job keeps running.
//!
//! # Scheduling state
//!
//! | Concern | Representation |
//! |---|---|
//! | Static parameters | `&[Task]`, never mutated |
//! | Per-task progress | `Vec<Cursor>` indexed by `TaskId`, local to one run |
//! | Priority rule | `PriorityRule` enum, dispatched by `match` |
//! | Tie-break | lowest `TaskId` among equal priority keys |
//!
//! A run owns all of its state, so independent runs may execute concurrently
//! without coordination, and the same inputs always produce the same trace.
//!
//! # Example
//! ```rust
//! use schedlab::scheduler::{simulate, PriorityRule};
//! use schedlab::task::Task;
//!
//! let tasks = vec![Task::new(1, 4, 4, 0).unwrap(), Task::new(2, 6, 6, 0).unwrap()];
//! let trace = simulate(&tasks, 12, PriorityRule::RateMonotonic);
//! assert_eq!(trace[0].task_id, 0);
//! assert_eq!((trace[1].start_time, trace[1].end_time), (1, 3));
//! ```

pub mod deadline;

pub use deadline::{first_failed_deadline, DeadlineMiss, MissKind};

use serde::Serialize;
use tracing::{debug, trace};

use crate::task::{Task, TaskId};

// ── Jobs and records ──────────────────────────────────────────────────────────

/// One release of a task: `(task_id, round)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Job {
    pub task_id: TaskId,
    pub round: u64,
}

/// A maximal contiguous interval `[start_time, end_time)` during which one job
/// ran without preemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunningRecord {
    pub task_id: TaskId,
    pub round: u64,
    pub start_time: u64,
    /// Exclusive.
    pub end_time: u64,
}

impl RunningRecord {
    pub fn job(&self) -> Job {
        Job {
            task_id: self.task_id,
            round: self.round,
        }
    }

    pub fn duration(&self) -> u64 {
        self.end_time - self.start_time
    }
}

// ── Priority rules ────────────────────────────────────────────────────────────

/// Rule that picks the job to run from the ready set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriorityRule {
    /// Smallest absolute deadline of the current round.
    #[serde(rename = "EDF")]
    EarliestDeadlineFirst,
    /// Smallest period.
    #[serde(rename = "RM")]
    RateMonotonic,
    /// Smallest relative deadline.
    #[serde(rename = "DM")]
    DeadlineMonotonic,
}

impl PriorityRule {
    /// Priority key of `job`; smaller runs first.
    pub fn key(self, task: &Task, round: u64) -> u64 {
        match self {
            PriorityRule::EarliestDeadlineFirst => task.deadline_at(round),
            PriorityRule::RateMonotonic => task.period,
            PriorityRule::DeadlineMonotonic => task.deadline,
        }
    }

    /// `true` for the rules whose priorities do not change between rounds.
    pub fn is_fixed_priority(self) -> bool {
        !matches!(self, PriorityRule::EarliestDeadlineFirst)
    }

    /// Pick the job to run among `ready`, or `None` when it is empty.
    ///
    /// Equal keys are broken by the lowest `task_id`.
    pub fn select(self, tasks: &[Task], ready: &[Job]) -> Option<Job> {
        ready
            .iter()
            .copied()
            .min_by_key(|job| (self.key(&tasks[job.task_id], job.round), job.task_id))
    }

    /// Task ids ordered from highest to lowest fixed priority.
    ///
    /// Uses the round-0 key, which is the only key for RM and DM.
    pub fn priority_order(self, tasks: &[Task]) -> Vec<TaskId> {
        let mut order: Vec<TaskId> = (0..tasks.len()).collect();
        order.sort_by_key(|&id| (self.key(&tasks[id], 0), id));
        order
    }
}

impl std::fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PriorityRule::EarliestDeadlineFirst => "EDF",
            PriorityRule::RateMonotonic => "RM",
            PriorityRule::DeadlineMonotonic => "DM",
        };
        f.write_str(name)
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

/// Per-task simulation state: the round being awaited or executed and, once
/// that round has started, its remaining execution time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cursor {
    round: u64,
    remaining: Option<u64>,
}

impl Cursor {
    /// Mid-execution, or the current round has been released by `t`.
    fn is_ready(self, task: &Task, t: u64) -> bool {
        self.remaining.is_some() || task.release_at(self.round) <= t
    }

    /// Run one tick.  Returns the next cursor and whether the round completed.
    fn step(self, task: &Task) -> (Cursor, bool) {
        let left = self.remaining.unwrap_or(task.wcet) - 1;
        if left == 0 {
            (
                Cursor {
                    round: self.round + 1,
                    remaining: None,
                },
                true,
            )
        } else {
            (
                Cursor {
                    round: self.round,
                    remaining: Some(left),
                },
                false,
            )
        }
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// Simulate `tasks` over `[0, horizon)` under `rule` and return the trace.
///
/// The trace is ordered by `start_time`, records never overlap, and two
/// adjacent records never belong to the same job unless separated by a gap
/// or by another job.  A tick with no ready job leaves no record.
///
/// The horizon is trusted: the tick loop is bounded only by it, so callers
/// must cap it (see [`crate::hyperperiod::calculate_hyperperiod`]).
pub fn simulate(tasks: &[Task], horizon: u64, rule: PriorityRule) -> Vec<RunningRecord> {
    let mut cursors = vec![Cursor::default(); tasks.len()];
    let mut records: Vec<RunningRecord> = Vec::new();
    let mut ready: Vec<Job> = Vec::with_capacity(tasks.len());
    let mut preemptions = 0usize;

    let mut t = 0;
    while t < horizon {
        ready.clear();
        ready.extend(
            tasks
                .iter()
                .zip(&cursors)
                .enumerate()
                .filter(|(_, (task, cursor))| cursor.is_ready(task, t))
                .map(|(task_id, (_, cursor))| Job {
                    task_id,
                    round: cursor.round,
                }),
        );

        let Some(job) = rule.select(tasks, &ready) else {
            // Idle: nothing is mid-execution, so skip straight to the next release.
            t = next_release(tasks, &cursors).map_or(horizon, |r| r.max(t + 1));
            continue;
        };

        let (next, completed) = cursors[job.task_id].step(&tasks[job.task_id]);
        cursors[job.task_id] = next;

        match records.last_mut() {
            Some(last) if last.job() == job && last.end_time == t => last.end_time += 1,
            last => {
                // The previous job is still unfinished if its cursor has not moved on.
                let preempted = last
                    .filter(|prev| prev.end_time == t && cursors[prev.task_id].round == prev.round)
                    .map(|prev| prev.task_id);
                if let Some(preempted) = preempted {
                    preemptions += 1;
                    trace!(t, preempted, by = job.task_id, "preemption");
                }
                records.push(RunningRecord {
                    task_id: job.task_id,
                    round: job.round,
                    start_time: t,
                    end_time: t + 1,
                });
            }
        }

        if completed {
            trace!(t = t + 1, task_id = job.task_id, round = job.round, "job completed");
        }

        t += 1;
    }

    debug!(
        %rule,
        horizon,
        task_count = tasks.len(),
        records = records.len(),
        preemptions,
        "simulation finished"
    );

    records
}

/// Earliest release among the rounds every task is currently waiting for.
fn next_release(tasks: &[Task], cursors: &[Cursor]) -> Option<u64> {
    tasks
        .iter()
        .zip(cursors)
        .map(|(task, cursor)| task.release_at(cursor.round))
        .min()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
