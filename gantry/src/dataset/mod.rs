/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Sectioned dataset parser.
//!
//! Turns the header-tagged project dataset text into a [`ParsedDataset`]
//! holding five groups: general info, projects, precedence relations,
//! duration/resources and resource availability.
//!
//! ```text
//! ****************************************
//! # General Information
//! projects: 1
//! jobs (incl. supersource/sink): 4
//! horizon: 20
//!   - renewable: 1 R
//! # Projects summary
//! pronr. #jobs rel.date duedate tardcost MPM-Time
//!   1     2     0       10      3        5
//! # Precedence relations
//! 1 1 1 2
//! 2 1 0
//! # Duration and resources
//! 1 1 3 1
//! 2 1 2 1
//! # Resource availability
//! R1 1
//! ```
//!
//! # Parsing model
//! * A [`ParseState`] machine tracks the current section; only recognised
//!   `#` header lines move it.
//! * Blank lines and `*` lines are ignored in every state.
//! * Data lines are parsed positionally per section.  A line with the wrong
//!   field count (or a non-integer where an integer is expected) is skipped
//!   and its line number recorded — never fatal.
//! * Resource labels `R1..Rn` are derived **once** from the first
//!   duration/resource row.  Any later row with a different number of resource
//!   columns is a hard [`DatasetError::InconsistentResourceColumns`].
//!
//! The result is assembled in a private accumulator and returned as one
//! immutable value; a failed parse never leaks partial state.

pub mod error;
pub mod section;

pub use error::DatasetError;
pub use section::{LineKind, ParseState, Section};

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::job::ResourceKind;

// ── Records ───────────────────────────────────────────────────────────────────

/// `key: value` facts from the general-information section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralInfo {
    pub projects: Option<u32>,
    pub jobs: Option<u32>,
    pub horizon: Option<i64>,
    /// Resource counts keyed by kind (`renewable`, `nonrenewable`,
    /// `doubly_constrained`).
    pub resource_counts: BTreeMap<ResourceKind, u32>,
}

/// One row of the projects summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub pronr: u32,
    pub jobs: u32,
    pub release_date: i64,
    pub due_date: i64,
    pub tardiness_cost: i64,
    /// Critical-path (MPM) time.
    pub mpm_time: i64,
}

/// One row of the precedence relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceRecord {
    pub jobnr: u32,
    pub modes: u32,
    /// Declared successor count (informational; `successors` is authoritative).
    pub successor_count: u32,
    pub successors: Vec<u32>,
}

/// One row of the duration/resources section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationRecord {
    pub jobnr: u32,
    pub mode: u32,
    pub duration: i64,
    /// Demands aligned with [`ParsedDataset::resource_labels`].
    pub demands: Vec<i64>,
}

/// One row of the resource availability section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAvailability {
    pub resource: String,
    pub quantity: i64,
}

// ── ParsedDataset ─────────────────────────────────────────────────────────────

/// Immutable result of parsing one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDataset {
    pub general_info: GeneralInfo,
    pub projects: Vec<ProjectRecord>,
    pub precedence: Vec<PrecedenceRecord>,
    pub durations: Vec<DurationRecord>,
    pub availability: Vec<ResourceAvailability>,
    /// Positional resource labels (`R1..Rn`), derived from the first
    /// duration/resource row and shared by every row.
    pub resource_labels: Vec<String>,
    /// 1-based line numbers of data lines that were skipped as malformed.
    pub skipped_lines: Vec<usize>,
}

impl ParsedDataset {
    /// Returns `true` if no record was parsed for `section`.
    pub fn is_section_empty(&self, section: Section) -> bool {
        match section {
            Section::GeneralInfo => self.general_info == GeneralInfo::default(),
            Section::Projects => self.projects.is_empty(),
            Section::Precedence => self.precedence.is_empty(),
            Section::DurationResources => self.durations.is_empty(),
            Section::ResourceAvailability => self.availability.is_empty(),
        }
    }

    /// Demand of `record` on the resource labelled `label`, `0` when the label
    /// is unknown.
    pub fn demand(&self, record: &DurationRecord, label: &str) -> i64 {
        self.resource_labels
            .iter()
            .position(|l| l == label)
            .and_then(|idx| record.demands.get(idx))
            .copied()
            .unwrap_or(0)
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Parse dataset text.
///
/// # Errors
/// Only [`DatasetError::InconsistentResourceColumns`]; every other defect is
/// skipped line-by-line.
pub fn parse_dataset(text: &str) -> Result<ParsedDataset, DatasetError> {
    let mut acc = Accumulator::default();
    let mut state = ParseState::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let kind = LineKind::classify(raw);
        let next = state.transition(&kind);
        if next != state {
            debug!(line = line_no, from = ?state, to = ?next, "section change");
            state = next;
        }

        let LineKind::Data(line) = kind else {
            continue;
        };
        let Some(section) = state.section() else {
            debug!(line = line_no, "data before first section header — ignored");
            continue;
        };

        let accepted = match section {
            Section::GeneralInfo => acc.general_line(line),
            Section::Projects => acc.project_line(line),
            Section::Precedence => acc.precedence_line(line),
            Section::DurationResources => acc.duration_line(line, line_no)?,
            Section::ResourceAvailability => acc.availability_line(line),
        };
        if !accepted {
            debug!(line = line_no, section = %section, text = line, "malformed line skipped");
            acc.skipped.push(line_no);
        }
    }

    let dataset = acc.finish();
    info!(
        projects = dataset.projects.len(),
        precedence = dataset.precedence.len(),
        durations = dataset.durations.len(),
        resources = dataset.availability.len(),
        skipped = dataset.skipped_lines.len(),
        "dataset parsed"
    );
    Ok(dataset)
}

/// Read and parse a dataset file.
pub fn parse_file(path: &Path) -> anyhow::Result<ParsedDataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open dataset file: {}", path.display()))?;
    parse_dataset(&text).with_context(|| format!("Failed to parse dataset: {}", path.display()))
}

// ── Accumulator (private) ─────────────────────────────────────────────────────

#[derive(Default)]
struct Accumulator {
    general_info: GeneralInfo,
    projects: Vec<ProjectRecord>,
    precedence: Vec<PrecedenceRecord>,
    durations: Vec<DurationRecord>,
    availability: Vec<ResourceAvailability>,
    resource_labels: Option<Vec<String>>,
    skipped: Vec<usize>,
}

impl Accumulator {
    /// `key: value`; the value's ASCII digits form the number.
    fn general_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.split_once(':') else {
            return false;
        };
        let key = key.trim().to_ascii_lowercase();
        let digits: String = value.chars().filter(char::is_ascii_digit).collect();
        if key.is_empty() || digits.is_empty() {
            return false;
        }
        let Ok(number) = digits.parse::<u32>() else {
            return false;
        };

        let info = &mut self.general_info;
        if key.contains("projects") {
            info.projects = Some(number);
        } else if key.contains("jobs") {
            info.jobs = Some(number);
        } else if key.contains("horizon") {
            info.horizon = Some(i64::from(number));
        } else if key.contains("nonrenewable") {
            info.resource_counts.insert(ResourceKind::Nonrenewable, number);
        } else if key.contains("renewable") {
            info.resource_counts.insert(ResourceKind::Renewable, number);
        } else if key.contains("doubly constrained") {
            info.resource_counts
                .insert(ResourceKind::DoublyConstrained, number);
        } else {
            debug!(key = %key, "unrecognised general-info key");
        }
        true
    }

    fn project_line(&mut self, line: &str) -> bool {
        // Repeated column-label row.
        if line.to_ascii_lowercase().contains("pronr.") {
            return true;
        }
        let Some(f) = int_fields::<i64>(line) else {
            return false;
        };
        let [pronr, jobs, release_date, due_date, tardiness_cost, mpm_time] = f[..] else {
            return false;
        };
        let (Ok(pronr), Ok(jobs)) = (u32::try_from(pronr), u32::try_from(jobs)) else {
            return false;
        };
        self.projects.push(ProjectRecord {
            pronr,
            jobs,
            release_date,
            due_date,
            tardiness_cost,
            mpm_time,
        });
        true
    }

    fn precedence_line(&mut self, line: &str) -> bool {
        let Some(f) = int_fields::<u32>(line) else {
            return false;
        };
        if f.len() < 3 {
            return false;
        }
        self.precedence.push(PrecedenceRecord {
            jobnr: f[0],
            modes: f[1],
            successor_count: f[2],
            successors: f[3..].to_vec(),
        });
        true
    }

    fn duration_line(&mut self, line: &str, line_no: usize) -> Result<bool, DatasetError> {
        let Some(f) = int_fields::<i64>(line) else {
            return Ok(false);
        };
        if f.len() < 3 {
            return Ok(false);
        }
        let (Ok(jobnr), Ok(mode)) = (u32::try_from(f[0]), u32::try_from(f[1])) else {
            return Ok(false);
        };
        let demands = f[3..].to_vec();

        match &self.resource_labels {
            None => {
                let labels: Vec<String> = (1..=demands.len()).map(|i| format!("R{i}")).collect();
                debug!(labels = ?labels, "resource labels derived from first row");
                self.resource_labels = Some(labels);
            }
            Some(labels) if labels.len() != demands.len() => {
                return Err(DatasetError::InconsistentResourceColumns {
                    line: line_no,
                    expected: labels.len(),
                    found: demands.len(),
                });
            }
            Some(_) => {}
        }

        self.durations.push(DurationRecord {
            jobnr,
            mode,
            duration: f[2],
            demands,
        });
        Ok(true)
    }

    fn availability_line(&mut self, line: &str) -> bool {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [name, qty] = fields[..] else {
            return false;
        };
        let Ok(quantity) = qty.parse::<i64>() else {
            return false;
        };
        self.availability.push(ResourceAvailability {
            resource: name.to_string(),
            quantity,
        });
        true
    }

    fn finish(self) -> ParsedDataset {
        ParsedDataset {
            general_info: self.general_info,
            projects: self.projects,
            precedence: self.precedence,
            durations: self.durations,
            availability: self.availability,
            resource_labels: self.resource_labels.unwrap_or_default(),
            skipped_lines: self.skipped,
        }
    }
}

/// Parse every whitespace-separated field as an integer; `None` if any field
/// is not one.
fn int_fields<T: std::str::FromStr>(line: &str) -> Option<Vec<T>> {
    line.split_whitespace().map(|t| t.parse().ok()).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
