/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task-set file loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! algorithm: rm            # optional: edf | rm | dm | all
//! horizon: 48              # optional, defaults to the hyperperiod
//! max_hyperperiod: 100000  # optional, defaults to 10_000_000 ticks
//! tasks:
//!   - { wcet: 1, deadline: 4, period: 4, offset: 0 }
//!   - { wcet: 2, deadline: 6, period: 6, offset: 0 }
//! ```
//!
//! Task fields are optional here: a task with a missing field is loaded and
//! later rejected by validation.  A non-numeric or negative value is a parse
//! error for the whole file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisError, AnalysisOptions};
use crate::hyperperiod::DEFAULT_HYPERPERIOD_LIMIT;
use crate::scheduler::PriorityRule;
use crate::task::TaskCandidate;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskSetFile {
    algorithm: Option<String>,
    horizon: Option<u64>,
    max_hyperperiod: Option<u64>,
    #[serde(default)]
    tasks: Vec<TaskCandidate>,
}

// ── Discipline selection ──────────────────────────────────────────────────────

/// One discipline, or all three in `EDF, RM, DM` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    One(PriorityRule),
    All,
}

impl Selection {
    pub fn rules(self) -> Vec<PriorityRule> {
        match self {
            Selection::One(rule) => vec![rule],
            Selection::All => vec![
                PriorityRule::EarliestDeadlineFirst,
                PriorityRule::RateMonotonic,
                PriorityRule::DeadlineMonotonic,
            ],
        }
    }
}

impl std::str::FromStr for Selection {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::One)
        }
    }
}

// ── TaskSetConfig ─────────────────────────────────────────────────────────────

/// A task set and its analysis settings, as loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSetConfig {
    pub selection: Option<Selection>,
    pub horizon: Option<u64>,
    pub max_hyperperiod: u64,
    pub tasks: Vec<TaskCandidate>,
}

impl TaskSetConfig {
    /// Read and parse the task-set file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is malformed, or
    /// the `algorithm` name is unknown.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading task set from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open task-set file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to load task set: {}", path.display()))
    }

    /// Parse a task set from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: TaskSetFile =
            serde_yaml::from_str(content).context("Failed to parse task-set YAML")?;

        let selection = file
            .algorithm
            .as_deref()
            .map(str::parse::<Selection>)
            .transpose()?;

        if file.tasks.is_empty() {
            warn!("Task-set file contains no tasks");
        }
        for (index, task) in file.tasks.iter().enumerate() {
            debug!(
                index,
                wcet = ?task.wcet,
                deadline = ?task.deadline,
                period = ?task.period,
                offset = ?task.offset,
                "  Task"
            );
        }
        info!(
            task_count = file.tasks.len(),
            algorithm = ?selection,
            horizon = ?file.horizon,
            "Loaded task set"
        );

        Ok(Self {
            selection,
            horizon: file.horizon,
            max_hyperperiod: file.max_hyperperiod.unwrap_or(DEFAULT_HYPERPERIOD_LIMIT),
            tasks: file.tasks,
        })
    }

    /// Analyzer options carried by this file.
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            horizon: self.horizon,
            hyperperiod_limit: self.max_hyperperiod,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_full_task_set() {
        let yaml = r#"
algorithm: RM
horizon: 24
max_hyperperiod: 1000
tasks:
  - { wcet: 1, deadline: 4, period: 4, offset: 0 }
  - wcet: 2
    deadline: 6
    period: 6
    offset: 0
"#;
        let f = yaml_tempfile(yaml);
        let cfg = TaskSetConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.selection, Some(Selection::One(PriorityRule::RateMonotonic)));
        assert_eq!(
            cfg.tasks,
            vec![
                TaskCandidate::complete(1, 4, 4, 0),
                TaskCandidate::complete(2, 6, 6, 0)
            ]
        );
        assert_eq!(
            cfg.options(),
            AnalysisOptions {
                horizon: Some(24),
                hyperperiod_limit: 1000
            }
        );
    }

    #[test]
    fn optional_settings_use_defaults_when_absent() {
        let f = yaml_tempfile("tasks:\n  - { wcet: 1, deadline: 2, period: 2, offset: 0 }\n");
        let cfg = TaskSetConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.selection, None);
        assert_eq!(cfg.options(), AnalysisOptions::default());
    }

    #[test]
    fn missing_task_field_loads_as_none() {
        let f = yaml_tempfile("tasks:\n  - { wcet: 1, period: 5, offset: 0 }\n");
        let cfg = TaskSetConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg.tasks[0].deadline, None);
        assert_eq!(cfg.tasks[0].period, Some(5));
    }

    #[test]
    fn non_numeric_field_returns_error() {
        let f = yaml_tempfile("tasks:\n  - { wcet: one, deadline: 2, period: 2, offset: 0 }\n");
        assert!(TaskSetConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn negative_field_returns_error() {
        let f = yaml_tempfile("tasks:\n  - { wcet: -1, deadline: 2, period: 2, offset: 0 }\n");
        assert!(TaskSetConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_algorithm_returns_error() {
        let err = TaskSetConfig::from_yaml_str("algorithm: fifo\ntasks: []\n").unwrap_err();
        assert!(format!("{err:#}").contains("fifo"));
    }

    #[test]
    fn missing_file_returns_error() {
        let result = TaskSetConfig::load_from_file(Path::new("/nonexistent/taskset.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(TaskSetConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn demo_task_sets_load() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        for (name, count) in [
            ("rm_classic.yaml", 2),
            ("edf_constrained.yaml", 2),
            ("dm_response_time.yaml", 3),
            ("mixed_offsets.yaml", 3),
        ] {
            let cfg = TaskSetConfig::load_from_file(&demos.join(name)).unwrap();
            assert_eq!(cfg.tasks.len(), count, "{name}");
            assert!(cfg.selection.is_some(), "{name}");
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    #[test]
    fn selection_all_expands_to_three_rules() {
        let selection: Selection = "ALL".parse().unwrap();
        assert_eq!(selection, Selection::All);
        assert_eq!(selection.rules().len(), 3);
        assert_eq!(
            "dm".parse::<Selection>().unwrap().rules(),
            vec![PriorityRule::DeadlineMonotonic]
        );
    }
}
