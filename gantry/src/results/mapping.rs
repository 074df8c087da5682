/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Machine assignment for job-shop results.
//!
//! A [`MachineMapping`] holds one row of machine indices per job.  Rows come
//! from a [`MachineMappingSource`] (mapping file, JSS instance, fixed value) or,
//! when the source has nothing, from [`default_mapping`].  Before use every row
//! is [`reconcile`]d with the job's operation count:
//!
//! | Row vs. operations | Action |
//! |---|---|
//! | equal | kept |
//! | shorter (non-empty) | extended cyclically: entry `i` gets `i mod len` |
//! | empty, or job has no row | replaced by the default row |
//! | longer | truncated |

use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use super::error::ResultFormatError;
use super::instance::JssInstance;

// ── MachineMapping ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineMapping {
    rows: Vec<Vec<usize>>,
}

impl MachineMapping {
    pub fn new(rows: Vec<Vec<usize>>) -> Self {
        Self { rows }
    }

    /// Mapping file text: one line per job, whitespace-separated machine
    /// indices.  Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ResultFormatError> {
        let mut rows = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<usize>().map_err(|_| ResultFormatError::BadMachineIndex {
                        line: idx + 1,
                        token: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    pub fn row(&self, job: usize) -> Option<&[usize]> {
        self.rows.get(job).map(Vec::as_slice)
    }

    /// Reconcile every row against `shape` (operation count per job).
    ///
    /// The result has exactly `shape.len()` rows and row `j` has exactly
    /// `shape[j]` entries.
    pub fn reconciled(&self, shape: &[usize]) -> MachineMapping {
        let defaults = default_mapping(shape);
        let rows = shape
            .iter()
            .enumerate()
            .map(|(job, &ops)| match self.row(job) {
                Some(row) if !row.is_empty() || ops == 0 => {
                    if row.len() != ops {
                        warn!(
                            job,
                            operations = ops,
                            machines = row.len(),
                            "machine list length differs from operation count — reconciled"
                        );
                    }
                    reconcile(row, ops)
                }
                Some(_) => {
                    warn!(job, "empty machine list — default row used");
                    defaults.rows[job].clone()
                }
                None => {
                    warn!(job, "no mapping row — default row used");
                    defaults.rows[job].clone()
                }
            })
            .collect();
        if self.rows.len() > shape.len() {
            debug!(
                extra = self.rows.len() - shape.len(),
                "mapping rows beyond the last job ignored"
            );
        }
        MachineMapping { rows }
    }
}

// ── Reconciliation ────────────────────────────────────────────────────────────

/// Fit `row` to `ops` entries.
///
/// A shorter row is extended with `i mod row.len()` for `i in row.len()..ops`;
/// a longer one is truncated.  An empty row stays empty.
pub fn reconcile(row: &[usize], ops: usize) -> Vec<usize> {
    let len = row.len();
    if len >= ops || len == 0 {
        return row[..ops.min(len)].to_vec();
    }
    row.iter()
        .copied()
        .chain((len..ops).map(|i| i % len))
        .collect()
}

/// Synthesised mapping: `machine = (operation + job) mod machine_count`, where
/// `machine_count` is the longest operation list.
pub fn default_mapping(shape: &[usize]) -> MachineMapping {
    let machine_count = shape.iter().copied().max().unwrap_or(0);
    let rows = shape
        .iter()
        .enumerate()
        .map(|(job, &ops)| (0..ops).map(|op| (op + job) % machine_count).collect())
        .collect();
    MachineMapping { rows }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Where machine rows come from.  `Ok(None)` means "nothing available", which
/// callers answer with [`default_mapping`].
pub trait MachineMappingSource {
    fn describe(&self) -> String;

    fn load(&self) -> anyhow::Result<Option<MachineMapping>>;
}

/// Mapping file on disk.  A missing file is not an error.
#[derive(Debug, Clone)]
pub struct FileMapping {
    path: PathBuf,
}

impl FileMapping {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MachineMappingSource for FileMapping {
    fn describe(&self) -> String {
        format!("mapping file {}", self.path.display())
    }

    fn load(&self) -> anyhow::Result<Option<MachineMapping>> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "mapping file not found — using default mapping");
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot open mapping file: {}", self.path.display()))?;
        let mapping = MachineMapping::parse(&text)
            .with_context(|| format!("Failed to parse mapping file: {}", self.path.display()))?;
        info!(path = %self.path.display(), jobs = mapping.rows.len(), "machine mapping loaded");
        Ok(Some(mapping))
    }
}

impl MachineMappingSource for JssInstance {
    fn describe(&self) -> String {
        format!("JSS instance ({} jobs)", self.jobs.len())
    }

    fn load(&self) -> anyhow::Result<Option<MachineMapping>> {
        Ok(Some(MachineMapping::new(self.machine_rows())))
    }
}

/// A mapping known up front.
#[derive(Debug, Clone, Default)]
pub struct FixedMapping(pub MachineMapping);

impl MachineMappingSource for FixedMapping {
    fn describe(&self) -> String {
        String::from("fixed mapping")
    }

    fn load(&self) -> anyhow::Result<Option<MachineMapping>> {
        Ok(Some(self.0.clone()))
    }
}

/// Load from `source` (if any), fall back to the default, reconcile to `shape`.
pub fn resolve_mapping(
    source: Option<&dyn MachineMappingSource>,
    shape: &[usize],
) -> anyhow::Result<MachineMapping> {
    let loaded = match source {
        Some(s) => {
            debug!(source = %s.describe(), "loading machine mapping");
            s.load()?
        }
        None => None,
    };
    Ok(match loaded {
        Some(mapping) => mapping.reconciled(shape),
        None => {
            info!(jobs = shape.len(), "synthesising default machine mapping");
            default_mapping(shape)
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
