/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Parsers for schedules solved outside this pipeline.
//!
//! Both formats start with the integer makespan on the first line, followed by
//! one line per job:
//!
//! | Format | Token | Machine |
//! |---|---|---|
//! | solver output ([`parse_solver_output`]) | `start,duration` or `start,duration,machine` | given, else token index |
//! | job-shop result ([`parse_job_shop_result`]) | `start,duration` | from a [`MachineMappingSource`] |
//! | job-shop, start times only | `start` | from the JSS instance |
//!
//! ```text
//! result text ──parse──► ResultFile ──assign_machines(mapping)──► machine_timeline() ──► verify_machines
//!                                                              └─► to_schedule() (canonical)
//! ```

pub mod error;
pub mod instance;
pub mod mapping;

pub use error::ResultFormatError;
pub use instance::{JssInstance, JssOperation};
pub use mapping::{
    default_mapping, reconcile, resolve_mapping, FileMapping, FixedMapping, MachineMapping,
    MachineMappingSource,
};

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::feasibility::{MachineTimeline, TimelineOp};
use crate::schedule::{Schedule, ScheduledJob};

// ── Records ───────────────────────────────────────────────────────────────────

/// One operation of an externally solved job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOp {
    pub start: i64,
    pub duration: i64,
    /// `None` until a mapping has been applied (job-shop results).
    pub machine: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFile {
    pub makespan: i64,
    /// Operations per job, in file order.
    pub jobs: Vec<Vec<TimedOp>>,
}

impl ResultFile {
    /// Operation count per job.
    pub fn shape(&self) -> Vec<usize> {
        self.jobs.iter().map(Vec::len).collect()
    }

    /// Overwrite every operation's machine from a mapping already reconciled
    /// to [`shape`](Self::shape).
    pub fn assign_machines(&mut self, mapping: &MachineMapping) {
        for (job, ops) in self.jobs.iter_mut().enumerate() {
            let row = mapping.row(job).unwrap_or_default();
            for (op, &machine) in ops.iter_mut().zip(row) {
                op.machine = Some(machine);
            }
        }
    }

    /// Group operations by machine.  Operations without a machine are left out.
    pub fn machine_timeline(&self) -> MachineTimeline {
        let mut timeline = MachineTimeline::new();
        for (job, ops) in self.jobs.iter().enumerate() {
            for (operation, op) in ops.iter().enumerate() {
                if let Some(machine) = op.machine {
                    timeline.entry(machine).or_default().push(TimelineOp {
                        job,
                        operation,
                        start: op.start,
                        duration: op.duration,
                    });
                }
            }
        }
        timeline
    }

    /// Canonical form: one record per operation, machine `m` shown as a unit
    /// demand on resource `M<m>`.
    pub fn to_schedule(&self) -> Schedule {
        let entries = self
            .jobs
            .iter()
            .enumerate()
            .flat_map(|(job, ops)| {
                ops.iter().map(move |op| ScheduledJob {
                    start: op.start,
                    job_id: job,
                    duration: op.duration,
                    resource_usage: op
                        .machine
                        .map(|m| BTreeMap::from([(format!("M{m}"), 1)]))
                        .unwrap_or_default(),
                })
            })
            .collect();
        Schedule::new(entries, self.makespan)
    }
}

// ── Format selection ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultFormat {
    /// Job-shop when a mapping or instance is supplied, solver output otherwise.
    #[default]
    Auto,
    Solver,
    JobShop,
}

impl FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ResultFormat::Auto),
            "solver" => Ok(ResultFormat::Solver),
            "job-shop" => Ok(ResultFormat::JobShop),
            other => Err(format!(
                "unknown result format '{other}' (expected auto, solver or job-shop)"
            )),
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Non-blank lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

/// The first whitespace token of the first line, as an integer.
fn makespan_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<i64, ResultFormatError> {
    let (line, content) = lines.next().ok_or(ResultFormatError::Empty)?;
    let token = content.split_whitespace().next().unwrap_or_default();
    token.parse().map_err(|_| ResultFormatError::BadMakespan {
        line,
        value: token.to_string(),
    })
}

fn int(line: usize, token: &str, part: &str) -> Result<i64, ResultFormatError> {
    part.trim().parse().map_err(|_| ResultFormatError::MalformedPair {
        line,
        token: token.to_string(),
    })
}

/// Format A.
///
/// Tokens with other than two or three comma-separated parts are skipped.
/// Without an explicit machine, the token's index within its line is used.
///
/// # Example
/// ```rust
/// use gantry::results::parse_solver_output;
///
/// let result = parse_solver_output("5\n0,3 3,2\n").unwrap();
/// assert_eq!(result.jobs[0][1].machine, Some(1));
/// ```
pub fn parse_solver_output(text: &str) -> Result<ResultFile, ResultFormatError> {
    let mut lines = content_lines(text);
    let makespan = makespan_line(&mut lines)?;

    let mut jobs = Vec::new();
    for (line, content) in lines {
        let mut ops = Vec::new();
        for (index, token) in content.split_whitespace().enumerate() {
            let parts: Vec<&str> = token.split(',').collect();
            let (start, duration, machine) = match parts[..] {
                [s, d] => (int(line, token, s)?, int(line, token, d)?, index),
                [s, d, m] => {
                    let Ok(machine) = m.trim().parse::<usize>() else {
                        return Err(ResultFormatError::BadMachineIndex {
                            line,
                            token: token.to_string(),
                        });
                    };
                    (int(line, token, s)?, int(line, token, d)?, machine)
                }
                _ => {
                    debug!(line, token, "token skipped, expected start,duration");
                    continue;
                }
            };
            ops.push(TimedOp {
                start,
                duration,
                machine: Some(machine),
            });
        }
        jobs.push(ops);
    }

    info!(makespan, jobs = jobs.len(), "solver output parsed");
    Ok(ResultFile { makespan, jobs })
}

/// Format B.
///
/// Data lines are `start,duration` pairs; machines are left unassigned.  When
/// the first data line has no comma the file is read as bare start times and
/// `instance` must supply every duration.
pub fn parse_job_shop_result(
    text: &str,
    instance: Option<&JssInstance>,
) -> Result<ResultFile, ResultFormatError> {
    let mut lines = content_lines(text).peekable();
    let makespan = makespan_line(&mut lines)?;

    let start_times_only = lines.peek().is_some_and(|(_, l)| !l.contains(','));
    if start_times_only && instance.is_none() {
        return Err(ResultFormatError::DurationsRequired);
    }

    let mut jobs = Vec::new();
    for (job, (line, content)) in lines.enumerate() {
        let mut ops = Vec::new();
        for (operation, token) in content.split_whitespace().enumerate() {
            let (start, duration) = match (start_times_only, instance) {
                (true, Some(inst)) => {
                    let missing = ResultFormatError::MissingInstanceOperation { job, operation };
                    let op = inst.operation(job, operation).ok_or(missing)?;
                    (int(line, token, token)?, op.duration)
                }
                _ => {
                    let Some((s, d)) = token.split_once(',') else {
                        return Err(ResultFormatError::MalformedPair {
                            line,
                            token: token.to_string(),
                        });
                    };
                    (int(line, token, s)?, int(line, token, d)?)
                }
            };
            ops.push(TimedOp {
                start,
                duration,
                machine: None,
            });
        }
        jobs.push(ops);
    }

    info!(
        makespan,
        jobs = jobs.len(),
        start_times_only,
        "job-shop result parsed"
    );
    Ok(ResultFile { makespan, jobs })
}

// ── File-level entry point ────────────────────────────────────────────────────

/// Read a result file and assign machines.
///
/// * Solver output keeps its own machines; `mapping` and `instance` are
///   ignored with a warning.
/// * Job-shop results take machines from `mapping`, then from `instance`,
///   then the synthesised default.
pub fn load_result(
    path: &Path,
    format: ResultFormat,
    mapping: Option<&dyn MachineMappingSource>,
    instance: Option<&JssInstance>,
) -> anyhow::Result<ResultFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open result file: {}", path.display()))?;

    let format = match format {
        ResultFormat::Auto if mapping.is_some() || instance.is_some() => ResultFormat::JobShop,
        ResultFormat::Auto => ResultFormat::Solver,
        explicit => explicit,
    };
    debug!(?format, path = %path.display(), "reading result file");

    match format {
        ResultFormat::JobShop => {
            let mut result = parse_job_shop_result(&text, instance)
                .with_context(|| format!("Failed to parse job-shop result: {}", path.display()))?;
            let hint = instance.map(|i| i as &dyn MachineMappingSource);
            let machines = resolve_mapping(mapping.or(hint), &result.shape())?;
            result.assign_machines(&machines);
            Ok(result)
        }
        _ => {
            if mapping.is_some() || instance.is_some() {
                warn!(
                    path = %path.display(),
                    "solver output carries its own machines; mapping and instance ignored"
                );
            }
            parse_solver_output(&text)
                .with_context(|| format!("Failed to parse solver output: {}", path.display()))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::verify_machines;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ops(result: &ResultFile, job: usize) -> Vec<(i64, i64, Option<usize>)> {
        result.jobs[job]
            .iter()
            .map(|o| (o.start, o.duration, o.machine))
            .collect()
    }

    // ── Format A ──────────────────────────────────────────────────────────────

    #[test]
    fn solver_output_falls_back_to_token_index_for_machine() {
        let r = parse_solver_output("5\n0,3 3,2\n").unwrap();
        assert_eq!(r.makespan, 5);
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(0)), (3, 2, Some(1))]);
    }

    #[test]
    fn solver_output_uses_explicit_machine() {
        let r = parse_solver_output("9 extra\n0,3,2 3,2\n1,4,0\n").unwrap();
        assert_eq!(r.makespan, 9);
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(2)), (3, 2, Some(1))]);
        assert_eq!(ops(&r, 1), vec![(1, 4, Some(0))]);
    }

    #[test]
    fn solver_output_skips_tokens_with_wrong_part_count() {
        let r = parse_solver_output("5\n0 0,3 1,2,3,4 3,2\n").unwrap();
        // Fallback machine stays the token index, skipped tokens included.
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(1)), (3, 2, Some(3))]);
    }

    #[test]
    fn solver_output_rejects_non_integer_fields() {
        let err = parse_solver_output("5\n0,x\n").unwrap_err();
        assert_eq!(
            err,
            ResultFormatError::MalformedPair {
                line: 2,
                token: "0,x".into()
            }
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let r = parse_solver_output("\n5\n\n0,1\n\n1,1\n").unwrap();
        assert_eq!(r.jobs.len(), 2);
    }

    #[test]
    fn empty_text_is_an_error() {
        assert_eq!(
            parse_solver_output("  \n").unwrap_err(),
            ResultFormatError::Empty
        );
    }

    #[test]
    fn non_integer_makespan_is_an_error() {
        let err = parse_job_shop_result("abc\n0,1\n", None).unwrap_err();
        assert!(matches!(err, ResultFormatError::BadMakespan { line: 1, .. }));
    }

    // ── Format B ──────────────────────────────────────────────────────────────

    #[test]
    fn job_shop_result_leaves_machines_unassigned() {
        let r = parse_job_shop_result("7\n0,3 3,4\n0,2 2,5\n", None).unwrap();
        assert_eq!(r.shape(), vec![2, 2]);
        assert!(r.jobs.iter().flatten().all(|o| o.machine.is_none()));
    }

    #[test]
    fn job_shop_result_requires_pairs() {
        let err = parse_job_shop_result("7\n0,3 3\n", None).unwrap_err();
        assert!(matches!(err, ResultFormatError::MalformedPair { line: 2, .. }));
    }

    #[test]
    fn start_times_only_need_an_instance() {
        let err = parse_job_shop_result("7\n0 3\n", None).unwrap_err();
        assert_eq!(err, ResultFormatError::DurationsRequired);
    }

    #[test]
    fn start_times_take_durations_from_instance() {
        let inst = JssInstance::parse("2 2\n0 3 1 4\n1 2 0 5\n").unwrap();
        let r = parse_job_shop_result("10\n0 3\n0 5\n", Some(&inst)).unwrap();
        assert_eq!(ops(&r, 0), vec![(0, 3, None), (3, 4, None)]);
        assert_eq!(ops(&r, 1), vec![(0, 2, None), (5, 5, None)]);
    }

    #[test]
    fn start_times_beyond_instance_are_an_error() {
        let inst = JssInstance::parse("1 1\n0 3\n").unwrap();
        let err = parse_job_shop_result("3\n0 3\n", Some(&inst)).unwrap_err();
        let expected = ResultFormatError::MissingInstanceOperation {
            job: 0,
            operation: 1,
        };
        assert_eq!(err, expected);
    }

    // ── Machines & timeline ───────────────────────────────────────────────────

    #[test]
    fn assigned_machines_build_the_timeline() {
        let mut r = parse_job_shop_result("7\n0,3 3,4\n0,2 3,4\n", None).unwrap();
        let mapping = resolve_mapping(None, &r.shape()).unwrap();
        r.assign_machines(&mapping);

        let timeline = r.machine_timeline();
        // Default mapping: job 0 → [0, 1], job 1 → [1, 0].
        assert_eq!(timeline[&0].len(), 2);
        let second = TimelineOp {
            job: 0,
            operation: 1,
            start: 3,
            duration: 4,
        };
        assert_eq!(timeline[&1][0], second);
        assert!(verify_machines(&timeline).is_clean());
    }

    #[test]
    fn conflicting_mapping_is_detected_by_verifier() {
        let mut r = parse_job_shop_result("7\n0,3 3,4\n0,2 3,4\n", None).unwrap();
        let fixed = FixedMapping(MachineMapping::new(vec![vec![0, 1], vec![0]]));
        let mapping = resolve_mapping(Some(&fixed), &r.shape()).unwrap();
        assert_eq!(mapping.row(1), Some(&[0, 0][..]));
        r.assign_machines(&mapping);

        let report = verify_machines(&r.machine_timeline());
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.overlaps[0].machine, 0);
        assert_eq!((report.overlaps[0].from, report.overlaps[0].to), (0, 2));
    }

    #[test]
    fn canonical_schedule_uses_machine_resources() {
        let r = parse_solver_output("5\n0,3 3,2\n").unwrap();
        let schedule = r.to_schedule();
        assert_eq!(schedule.len(), 2);
        let usage = BTreeMap::from([("M1".to_string(), 1)]);
        assert_eq!(schedule.entries()[1].resource_usage, usage);
        assert_eq!(schedule.makespan(), 5);
    }

    // ── load_result ───────────────────────────────────────────────────────────

    #[test]
    fn load_result_auto_detects_job_shop_from_mapping() {
        let mut result = NamedTempFile::new().unwrap();
        write!(result, "7\n0,3 3,4\n0,2 3,4\n").unwrap();
        let mut mapping = NamedTempFile::new().unwrap();
        write!(mapping, "1 0\n0 1\n").unwrap();

        let source = FileMapping::new(mapping.path());
        let r = load_result(result.path(), ResultFormat::Auto, Some(&source), None).unwrap();
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(1)), (3, 4, Some(0))]);
    }

    #[test]
    fn load_result_uses_instance_machines_for_start_times() {
        let inst = JssInstance::parse("2 2\n1 3 0 4\n0 2 1 5\n").unwrap();
        let mut result = NamedTempFile::new().unwrap();
        write!(result, "10\n0 3\n0 7\n").unwrap();

        let r = load_result(result.path(), ResultFormat::Auto, None, Some(&inst)).unwrap();
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(1)), (3, 4, Some(0))]);
        assert!(verify_machines(&r.machine_timeline()).is_clean());
    }

    #[test]
    fn load_result_without_hints_reads_solver_output() {
        let mut result = NamedTempFile::new().unwrap();
        write!(result, "5\n0,3 3,2\n").unwrap();
        let r = load_result(result.path(), ResultFormat::Auto, None, None).unwrap();
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(0)), (3, 2, Some(1))]);
    }

    #[test]
    fn explicit_solver_format_keeps_file_machines_despite_hints() {
        let inst = JssInstance::parse("1 3\n2 3 2 2\n").unwrap();
        let mapping = FixedMapping(MachineMapping::new(vec![vec![2, 2]]));
        let mut result = NamedTempFile::new().unwrap();
        write!(result, "5\n0,3 3,2\n").unwrap();

        let r = load_result(
            result.path(),
            ResultFormat::Solver,
            Some(&mapping),
            Some(&inst),
        )
        .unwrap();
        assert_eq!(ops(&r, 0), vec![(0, 3, Some(0)), (3, 2, Some(1))]);
    }

    #[test]
    fn result_format_parses_from_cli_names() {
        let parsed = "job-shop".parse::<ResultFormat>().unwrap();
        assert_eq!(parsed, ResultFormat::JobShop);
        assert!("xml".parse::<ResultFormat>().is_err());
    }
}
