/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hyperperiod calculation.
//!
//! The hyperperiod of a periodic task set is the LCM of all its periods: the
//! smallest window after which the release pattern repeats.  It is the
//! default simulation horizon, so it is also where the caller's resource
//! budget is enforced: a hyperperiod above the configured limit is an error
//! rather than a silently enormous tick loop.

pub mod math;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::task::Task;
use math::lcm_of_slice;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the hyperperiod, in ticks.
pub const DEFAULT_HYPERPERIOD_LIMIT: u64 = 10_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur during hyperperiod calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperperiodError {
    /// The task slice was empty.
    NoValidPeriods,

    /// LCM calculation overflowed `u64`.
    Overflow { a: u64, b: u64 },

    /// The calculated hyperperiod exceeded the configured limit.
    TooLarge { value: u64, limit: u64 },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::NoValidPeriods => {
                write!(f, "no tasks with a valid (non-zero) period")
            }
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyperperiod {value} exceeds limit {limit} ticks")
            }
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Calculated hyperperiod for one task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HyperperiodInfo {
    /// LCM of all task periods.
    pub hyperperiod: u64,

    /// Unique periods present in the task set (sorted, deduplicated).
    pub unique_periods: Vec<u64>,

    /// Number of tasks that contributed.
    pub task_count: usize,
}

/// LCM of the task periods, without a limit check.
///
/// `Ok(0)` for an empty slice; use [`calculate_hyperperiod`] when an empty
/// set should be an error.
pub fn periods_lcm(tasks: &[Task]) -> Result<u64, HyperperiodError> {
    let periods: Vec<u64> = tasks.iter().map(|t| t.period).collect();
    lcm_of_slice(&periods)
}

/// Calculate the hyperperiod of `tasks` and check it against `limit`.
///
/// # Errors
/// * [`HyperperiodError::NoValidPeriods`] – `tasks` is empty.
/// * [`HyperperiodError::Overflow`] – LCM computation exceeded `u64`.
/// * [`HyperperiodError::TooLarge`] – result exceeds `limit`.
pub fn calculate_hyperperiod(
    tasks: &[Task],
    limit: u64,
) -> Result<HyperperiodInfo, HyperperiodError> {
    if tasks.is_empty() {
        warn!("No tasks to compute a hyperperiod for");
        return Err(HyperperiodError::NoValidPeriods);
    }

    let unique_periods: Vec<u64> = {
        let mut v: Vec<u64> = tasks.iter().map(|t| t.period).collect();
        v.sort_unstable();
        v.dedup();
        v
    };

    let hyperperiod = lcm_of_slice(&unique_periods)?;

    if hyperperiod > limit {
        warn!(hyperperiod, limit, "Hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit,
        });
    }

    info!(
        task_count = tasks.len(),
        unique_count = unique_periods.len(),
        hyperperiod,
        "Calculated hyperperiod"
    );
    debug!(periods = ?unique_periods, "unique periods");

    Ok(HyperperiodInfo {
        hyperperiod,
        unique_periods,
        task_count: tasks.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn with_period(period: u64) -> Task {
        Task {
            wcet: 1,
            deadline: period,
            period,
            offset: 0,
        }
    }

    #[test]
    fn two_periods() {
        let tasks = vec![with_period(4), with_period(6)];
        let info = calculate_hyperperiod(&tasks, DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.hyperperiod, 12);
        assert_eq!(info.task_count, 2);
    }

    #[test]
    fn unique_periods_are_sorted_and_deduped() {
        let tasks = vec![with_period(5), with_period(1), with_period(5), with_period(2)];
        let info = calculate_hyperperiod(&tasks, DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.unique_periods, vec![1, 2, 5]);
        assert_eq!(info.hyperperiod, 10);
        assert_eq!(info.task_count, 4);
    }

    #[test]
    fn empty_tasks_returns_no_valid_periods_error() {
        let result = calculate_hyperperiod(&[], DEFAULT_HYPERPERIOD_LIMIT);
        assert_eq!(result.unwrap_err(), HyperperiodError::NoValidPeriods);
    }

    #[test]
    fn exceeding_limit_returns_too_large_error() {
        let tasks = vec![with_period(7), with_period(11)];
        let result = calculate_hyperperiod(&tasks, 50);
        assert_eq!(
            result.unwrap_err(),
            HyperperiodError::TooLarge {
                value: 77,
                limit: 50
            }
        );
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let tasks = vec![with_period(7), with_period(11)];
        assert_eq!(calculate_hyperperiod(&tasks, 77).unwrap().hyperperiod, 77);
    }

    #[test]
    fn periods_lcm_of_empty_is_zero() {
        assert_eq!(periods_lcm(&[]).unwrap(), 0);
    }
}
