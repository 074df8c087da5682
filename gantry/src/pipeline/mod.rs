/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end scheduling run.
//!
//! ```text
//! text ─parse─► ParsedDataset ─► ProjectInstance ─build─► ScheduleModel ─solve─► SolveOutcome
//!                                                                                  │
//!                       FeasibilityReport ◄─verify─ Schedule ◄─extract──────────────┘
//! ```
//!
//! Single-threaded and synchronous; the only blocking step is the engine call.
//! Everything a run creates is owned by the returned [`PipelineOutcome`].
//!
//! # Horizon
//!
//! | Priority | Source |
//! |---|---|
//! | 1 | explicit override ([`Pipeline::with_horizon`], e.g. `--horizon`) |
//! | 2 | `horizon` in [`PipelineConfig`] |
//! | 3 | `horizon` in the dataset's general information |
//! | 4 | sum of all job durations |

pub mod error;

pub use error::PipelineError;

use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::dataset::{parse_dataset, parse_file, ParsedDataset};
use crate::engine::{SolveEngine, SolveStatus};
use crate::feasibility::{verify_schedule, FeasibilityReport};
use crate::job::ProjectInstance;
use crate::model::{ScheduleModel, ScheduleModelBuilder};
use crate::schedule::{extract, Report, Schedule};

// ── Horizon ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizonSource {
    Override,
    Config,
    Dataset,
    TotalDuration,
}

impl fmt::Display for HorizonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HorizonSource::Override => "override",
            HorizonSource::Config => "config",
            HorizonSource::Dataset => "dataset",
            HorizonSource::TotalDuration => "sum of durations",
        };
        f.write_str(s)
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Instance and model of a run, before solving.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub instance: ProjectInstance,
    pub model: ScheduleModel,
    pub horizon: i64,
    pub horizon_source: HorizonSource,
    /// Dataset lines skipped as malformed.
    pub skipped_lines: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub status: SolveStatus,
    pub prepared: Prepared,
    /// Present only for OPTIMAL / FEASIBLE.
    pub schedule: Option<Schedule>,
    /// Present when a schedule exists and verification is enabled.
    pub feasibility: Option<FeasibilityReport>,
}

impl PipelineOutcome {
    pub fn report(&self, name_width: usize) -> Option<Report<'_>> {
        self.schedule
            .as_ref()
            .map(|s| Report::new(s, self.status).with_name_width(name_width))
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// One engine plus one configuration, reusable across datasets.
pub struct Pipeline<E: SolveEngine> {
    engine: E,
    config: PipelineConfig,
    horizon_override: Option<i64>,
}

impl<E: SolveEngine> Pipeline<E> {
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self {
            engine,
            config,
            horizon_override: None,
        }
    }

    /// Horizon taking precedence over configuration and dataset.
    pub fn with_horizon(mut self, horizon: Option<i64>) -> Self {
        self.horizon_override = horizon;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn resolve_horizon(&self, instance: &ProjectInstance) -> (i64, HorizonSource) {
        if let Some(h) = self.horizon_override {
            (h, HorizonSource::Override)
        } else if let Some(h) = self.config.horizon {
            (h, HorizonSource::Config)
        } else if let Some(h) = instance.declared_horizon {
            (h, HorizonSource::Dataset)
        } else {
            (instance.total_duration(), HorizonSource::TotalDuration)
        }
    }

    /// Parse and build, without solving.
    pub fn prepare(&self, text: &str) -> Result<Prepared, PipelineError> {
        self.prepare_dataset(&parse_dataset(text)?)
    }

    /// Build the instance and model of an already parsed dataset.
    pub fn prepare_dataset(&self, dataset: &ParsedDataset) -> Result<Prepared, PipelineError> {
        let instance = ProjectInstance::from_dataset(dataset)?;
        let (horizon, horizon_source) = self.resolve_horizon(&instance);
        info!(horizon, source = %horizon_source, "horizon resolved");

        let model = ScheduleModelBuilder::new(&instance).build(horizon)?;
        Ok(Prepared {
            instance,
            model,
            horizon,
            horizon_source,
            skipped_lines: dataset.skipped_lines.clone(),
        })
    }

    /// Full run: prepare, solve, extract and (optionally) verify.
    ///
    /// # Errors
    /// Dataset, model and extraction failures.  Engine statuses without a
    /// solution are returned in the outcome.
    pub fn run(&self, text: &str) -> Result<PipelineOutcome, PipelineError> {
        self.run_dataset(&parse_dataset(text)?)
    }

    pub fn run_dataset(&self, dataset: &ParsedDataset) -> Result<PipelineOutcome, PipelineError> {
        let prepared = self.prepare_dataset(dataset)?;

        let outcome = self.engine.solve(&prepared.model);
        info!(engine = self.engine.name(), status = %outcome.status, "engine returned");

        if !outcome.status.has_solution() {
            warn!(status = %outcome.status, "no schedule produced");
            return Ok(PipelineOutcome {
                status: outcome.status,
                prepared,
                schedule: None,
                feasibility: None,
            });
        }

        let schedule = extract(&prepared.model, &prepared.instance, &outcome)?;
        let feasibility = self
            .config
            .verify
            .then(|| verify_schedule(&schedule, &prepared.instance));

        Ok(PipelineOutcome {
            status: outcome.status,
            prepared,
            schedule: Some(schedule),
            feasibility,
        })
    }

    pub fn run_file(&self, path: &Path) -> anyhow::Result<PipelineOutcome> {
        let dataset = parse_file(path)?;
        self.run_dataset(&dataset)
            .with_context(|| format!("Pipeline failed for dataset: {}", path.display()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetError, Section};
    use crate::engine::testing::FixedValuationEngine;
    use crate::engine::{SerialSgsEngine, SolveOutcome};
    use crate::model::ModelError;
    use crate::schedule::ExtractError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TWO_JOBS: &str = "\
************************************************************************
# General Information
  - horizon : 40
  - renewable : 1 R
************************************************************************
# Precedence relations
jobnr.    #modes  #successors   successors
   1        1          1           2
   2        1          0
************************************************************************
# Duration and resources
jobnr. mode duration  R 1
------------------------------------------------------------------------
  1      1     3       1
  2      1     2       1
************************************************************************
# Resource availability
  RESOURCE         QTY
  R1                 1
************************************************************************
";

    fn sgs() -> Pipeline<SerialSgsEngine> {
        Pipeline::new(SerialSgsEngine::default(), PipelineConfig::default())
    }

    #[test]
    fn two_job_chain_end_to_end() {
        let out = sgs().run(TWO_JOBS).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);

        let schedule = out.schedule.as_ref().unwrap();
        assert_eq!(schedule.makespan(), 5);
        let starts: Vec<i64> = (0..2).map(|j| schedule.get(j).unwrap().start).collect();
        let ends: Vec<i64> = (0..2).map(|j| schedule.get(j).unwrap().end()).collect();
        assert_eq!(starts, vec![0, 3]);
        assert_eq!(ends, vec![3, 5]);
        assert!(out.feasibility.unwrap().is_clean());
    }

    #[test]
    fn end_to_end_report_text() {
        let out = sgs().run(TWO_JOBS).unwrap();
        let text = out.report(15).unwrap().to_string();
        assert!(text.starts_with("Optimal Schedule Length: 5\n"));
        assert!(text.contains("  job_2           [3,5]\n"));
    }

    #[test]
    fn column_label_rows_are_skipped() {
        let out = sgs().run(TWO_JOBS).unwrap();
        assert_eq!(out.prepared.skipped_lines, vec![7, 12, 13, 18]);
    }

    // ── Horizon resolution ────────────────────────────────────────────────────

    #[test]
    fn dataset_horizon_is_used_by_default() {
        let p = sgs().prepare(TWO_JOBS).unwrap();
        assert_eq!((p.horizon, p.horizon_source), (40, HorizonSource::Dataset));
    }

    #[test]
    fn config_horizon_beats_dataset() {
        let config = PipelineConfig {
            horizon: Some(12),
            ..Default::default()
        };
        let p = Pipeline::new(SerialSgsEngine::default(), config)
            .prepare(TWO_JOBS)
            .unwrap();
        assert_eq!((p.horizon, p.horizon_source), (12, HorizonSource::Config));
    }

    #[test]
    fn override_beats_config() {
        let config = PipelineConfig {
            horizon: Some(12),
            ..Default::default()
        };
        let p = Pipeline::new(SerialSgsEngine::default(), config)
            .with_horizon(Some(7))
            .prepare(TWO_JOBS)
            .unwrap();
        assert_eq!((p.horizon, p.horizon_source), (7, HorizonSource::Override));
    }

    #[test]
    fn total_duration_is_the_last_resort() {
        let text = "# Duration and resources\n1 1 3\n2 1 4\n";
        let p = sgs().prepare(text).unwrap();
        assert_eq!(
            (p.horizon, p.horizon_source),
            (7, HorizonSource::TotalDuration)
        );
    }

    #[test]
    fn negative_override_is_a_model_error() {
        let err = sgs().with_horizon(Some(-5)).run(TWO_JOBS).unwrap_err();
        assert!(matches!(err, PipelineError::Model(ModelError::InvalidHorizon(-5))));
    }

    // ── Failure policy ────────────────────────────────────────────────────────

    #[test]
    fn short_horizon_surfaces_infeasible_without_schedule() {
        let out = sgs().with_horizon(Some(4)).run(TWO_JOBS).unwrap();
        assert_eq!(out.status, SolveStatus::Infeasible);
        assert!(out.schedule.is_none());
        assert!(out.report(15).is_none());
    }

    #[test]
    fn missing_duration_section_is_fatal() {
        let err = sgs().run("# Precedence relations\n1 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Model(ModelError::MissingSection(Section::DurationResources))
        ));
    }

    #[test]
    fn inconsistent_columns_are_fatal() {
        let text = "# Duration and resources\n1 1 3 1 0\n2 1 2 1\n";
        let err = sgs().run(text).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Dataset(DatasetError::InconsistentResourceColumns { line: 3, .. })
        ));
    }

    #[test]
    fn unknown_status_from_engine_is_not_an_error() {
        let engine = FixedValuationEngine::new(SolveOutcome::unsolved(SolveStatus::Unknown));
        let out = Pipeline::new(engine, PipelineConfig::default())
            .run(TWO_JOBS)
            .unwrap();
        assert_eq!(out.status, SolveStatus::Unknown);
        assert!(out.schedule.is_none());
    }

    #[test]
    fn engine_overlap_is_reported_but_schedule_kept() {
        let model = sgs().prepare(TWO_JOBS).unwrap().model;
        let engine = FixedValuationEngine::with_starts(&model, SolveStatus::Feasible, &[0, 1]);
        let out = Pipeline::new(engine, PipelineConfig::default())
            .run(TWO_JOBS)
            .unwrap();

        assert!(out.schedule.is_some());
        let report = out.feasibility.unwrap();
        assert_eq!(report.precedence.len(), 1);
        assert_eq!(report.capacity.len(), 1);
    }

    #[test]
    fn verification_can_be_disabled() {
        let config = PipelineConfig {
            verify: false,
            ..Default::default()
        };
        let out = Pipeline::new(SerialSgsEngine::default(), config)
            .run(TWO_JOBS)
            .unwrap();
        assert!(out.schedule.is_some());
        assert!(out.feasibility.is_none());
    }

    #[test]
    fn missing_value_from_engine_is_an_extract_error() {
        let model = sgs().prepare(TWO_JOBS).unwrap().model;
        let engine = FixedValuationEngine::with_starts(&model, SolveStatus::Optimal, &[0, 3])
            .without(model.makespan());
        let err = Pipeline::new(engine, PipelineConfig::default())
            .run(TWO_JOBS)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extract(ExtractError::MissingValue { .. })
        ));
    }

    #[test]
    fn run_file_reads_from_disk() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(TWO_JOBS.as_bytes()).unwrap();
        let out = sgs().run_file(f.path()).unwrap();
        assert_eq!(out.schedule.unwrap().makespan(), 5);
    }

    #[test]
    fn run_file_reports_missing_path() {
        let err = sgs()
            .run_file(Path::new("/nonexistent/data.sm"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/data.sm"));
    }
}
