/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Canonical schedule and the extractor that produces it.
//!
//! ```text
//! SolveOutcome ──(extract)──► Schedule ──► Report (text)
//!      │                         │
//!      └ valuation               └ (start, job_id, duration, resource_usage)*
//! ```
//!
//! A [`Schedule`] is independent of where it came from: the extractor builds
//! one from a solved model, and the verifier and renderers only ever see this
//! representation.

pub mod error;
pub mod report;

pub use error::ExtractError;
pub use report::Report;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::SolveOutcome;
use crate::job::{JobId, ProjectInstance};
use crate::model::{ScheduleModel, Valuation, VarId};

// ── Canonical records ─────────────────────────────────────────────────────────

/// One job of a solved schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledJob {
    pub start: i64,
    pub job_id: JobId,
    pub duration: i64,
    /// Strictly positive demands only.
    pub resource_usage: BTreeMap<String, i64>,
}

impl ScheduledJob {
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// `job_<n>` with the 1-based dataset job number.
    pub fn name(&self) -> String {
        format!("job_{}", self.job_id + 1)
    }
}

/// Jobs ordered by `(start, job_id)`, plus the makespan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    makespan: i64,
    entries: Vec<ScheduledJob>,
}

impl Schedule {
    pub fn new(mut entries: Vec<ScheduledJob>, makespan: i64) -> Self {
        entries.sort_by_key(|e| (e.start, e.job_id));
        Self { makespan, entries }
    }

    pub fn makespan(&self) -> i64 {
        self.makespan
    }

    pub fn entries(&self) -> &[ScheduledJob] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, job_id: JobId) -> Option<&ScheduledJob> {
        self.entries.iter().find(|e| e.job_id == job_id)
    }

    /// Jobs using each resource, keyed by resource name, in start order.
    pub fn by_resource(&self) -> BTreeMap<&str, Vec<&ScheduledJob>> {
        let mut groups: BTreeMap<&str, Vec<&ScheduledJob>> = BTreeMap::new();
        for entry in &self.entries {
            for name in entry.resource_usage.keys() {
                groups.entry(name.as_str()).or_default().push(entry);
            }
        }
        groups
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

// ── ResultExtractor ───────────────────────────────────────────────────────────

fn value_of(model: &ScheduleModel, v: &Valuation, var: VarId) -> Result<i64, ExtractError> {
    v.get(var).ok_or_else(|| ExtractError::MissingValue {
        var: model.var(var).name.clone(),
    })
}

/// Read every job's start and end from the outcome's valuation.
///
/// `model` must have been built from `instance`.
///
/// # Errors
/// * [`ExtractError::NoSolution`] – status is not OPTIMAL/FEASIBLE or no
///   valuation was returned.
/// * [`ExtractError::MissingValue`] – a start, end or makespan variable has no
///   value.
/// * [`ExtractError::UnknownJob`] – model and instance disagree on the jobs.
pub fn extract(
    model: &ScheduleModel,
    instance: &ProjectInstance,
    outcome: &SolveOutcome,
) -> Result<Schedule, ExtractError> {
    let valuation = match (&outcome.valuation, outcome.status.has_solution()) {
        (Some(v), true) => v,
        _ => return Err(ExtractError::NoSolution(outcome.status)),
    };

    let mut entries = Vec::with_capacity(model.job_vars().len());
    for (pos, jv) in model.job_vars().iter().enumerate() {
        let job = instance
            .jobs
            .get(pos)
            .filter(|j| j.id == jv.job)
            .ok_or(ExtractError::UnknownJob { job: jv.job })?;
        let start = value_of(model, valuation, jv.start)?;
        let end = value_of(model, valuation, jv.end)?;
        debug!(job = job.number, start, end, "extracted");
        entries.push(ScheduledJob {
            start,
            job_id: job.id,
            duration: end - start,
            resource_usage: job.positive_demands(),
        });
    }

    let makespan = value_of(model, valuation, model.makespan())?;
    let schedule = Schedule::new(entries, makespan);
    info!(jobs = schedule.len(), makespan, status = %outcome.status, "schedule extracted");
    Ok(schedule)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
