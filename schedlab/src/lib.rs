/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! schedlab – uniprocessor schedulability analysis for periodic task sets
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task.rs         – Task, TaskCandidate, validation
//! ├── hyperperiod/    – LCM / GCD helpers, hyperperiod budget
//! ├── scheduler/      – tick simulator, priority rules, deadline misses
//! ├── feasibility/    – Liu & Layland, response-time, processor-demand tests
//! ├── analysis/       – orchestrator and report
//! └── config/         – YAML task-set files
//! ```

pub mod analysis;
pub mod config;
pub mod feasibility;
pub mod hyperperiod;
pub mod scheduler;
pub mod task;
