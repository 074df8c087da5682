/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule feasibility verification.
//!
//! # Status: advisory
//!
//! Every check here **logs and reports**; none of them rejects a schedule.
//! A schedule with findings is still returned to the caller and can still be
//! rendered.
//!
//! | Check | Input | Finding |
//! |---|---|---|
//! | [`verify_timeline`] | per-machine operations | [`Overlap`] |
//! | [`verify_capacity`] | canonical schedule + capacities | [`CapacityViolation`] |
//! | [`verify_precedence`] | canonical schedule + edges | [`PrecedenceViolation`] |
//!
//! The machine check compares **consecutive** operations only, after a stable
//! sort by start.  It is exact for unit-capacity machines; cumulative resources
//! with capacity > 1 go through the capacity sweep instead.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use crate::job::{JobId, ProjectInstance};
use crate::schedule::Schedule;

// ── Timeline ──────────────────────────────────────────────────────────────────

/// One operation placed on a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineOp {
    pub job: usize,
    pub operation: usize,
    pub start: i64,
    pub duration: i64,
}

impl TimelineOp {
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }
}

/// Operations grouped by machine index.
pub type MachineTimeline = BTreeMap<usize, Vec<TimelineOp>>;

// ── Findings ──────────────────────────────────────────────────────────────────

/// Two consecutive operations on one machine that run at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub machine: usize,
    pub previous: TimelineOp,
    pub current: TimelineOp,
    /// Overlapping interval `[from, to)`.
    pub from: i64,
    pub to: i64,
}

impl fmt::Display for Overlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "machine {}: job {} op {} [{},{}) overlaps job {} op {} [{},{}) during [{},{})",
            self.machine,
            self.previous.job,
            self.previous.operation,
            self.previous.start,
            self.previous.end(),
            self.current.job,
            self.current.operation,
            self.current.start,
            self.current.end(),
            self.from,
            self.to
        )
    }
}

/// Instant at which the summed demand on a resource exceeds its capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityViolation {
    pub resource: String,
    pub at: i64,
    pub load: i64,
    pub capacity: i64,
    /// Jobs active at `at`.
    pub jobs: Vec<JobId>,
}

impl fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource '{}' at t={}: load {} exceeds capacity {} (jobs {:?})",
            self.resource, self.at, self.load, self.capacity, self.jobs
        )
    }
}

/// Successor starting before its predecessor has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceViolation {
    pub predecessor: JobId,
    pub successor: JobId,
    pub predecessor_end: i64,
    pub successor_start: i64,
}

impl fmt::Display for PrecedenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "job {} starts at {} before predecessor job {} ends at {}",
            self.successor, self.successor_start, self.predecessor, self.predecessor_end
        )
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeasibilityReport {
    pub overlaps: Vec<Overlap>,
    pub capacity: Vec<CapacityViolation>,
    pub precedence: Vec<PrecedenceViolation>,
}

impl FeasibilityReport {
    pub fn is_clean(&self) -> bool {
        self.violation_count() == 0
    }

    pub fn violation_count(&self) -> usize {
        self.overlaps.len() + self.capacity.len() + self.precedence.len()
    }
}

impl fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No violations detected.");
        }
        writeln!(f, "{} violation(s) detected:", self.violation_count())?;
        for o in &self.overlaps {
            writeln!(f, "  overlap: {o}")?;
        }
        for c in &self.capacity {
            writeln!(f, "  capacity: {c}")?;
        }
        for p in &self.precedence {
            writeln!(f, "  precedence: {p}")?;
        }
        Ok(())
    }
}

// ── Checks ────────────────────────────────────────────────────────────────────

/// Per-machine overlap check over consecutive operations.
pub fn verify_timeline(timeline: &MachineTimeline) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    for (&machine, ops) in timeline {
        let mut sorted = ops.clone();
        sorted.sort_by_key(|op| op.start);
        for pair in sorted.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.end() > curr.start {
                let overlap = Overlap {
                    machine,
                    previous: prev,
                    current: curr,
                    from: curr.start,
                    to: prev.end().min(curr.end()),
                };
                warn!(machine, "{overlap}");
                overlaps.push(overlap);
            }
        }
    }
    overlaps
}

/// Sweep each resource's load at every job start.
///
/// Resources missing from `capacities` are unconstrained and not checked.
pub fn verify_capacity(
    schedule: &Schedule,
    capacities: &BTreeMap<String, i64>,
) -> Vec<CapacityViolation> {
    let mut violations = Vec::new();
    for (resource, users) in schedule.by_resource() {
        let Some(&capacity) = capacities.get(resource) else {
            continue;
        };
        // Load only rises at a start.
        let mut instants: Vec<i64> = users
            .iter()
            .filter(|j| j.duration > 0)
            .map(|j| j.start)
            .collect();
        instants.dedup();
        for t in instants {
            let active: Vec<_> = users
                .iter()
                .filter(|j| j.start <= t && t < j.end())
                .collect();
            let load: i64 = active.iter().map(|j| j.resource_usage[resource]).sum();
            if load > capacity {
                let v = CapacityViolation {
                    resource: resource.to_string(),
                    at: t,
                    load,
                    capacity,
                    jobs: active.iter().map(|j| j.job_id).collect(),
                };
                warn!(resource, at = t, "{v}");
                violations.push(v);
            }
        }
    }
    violations
}

/// Check `start[succ] ≥ start[pred] + duration[pred]` for every edge.
///
/// Edges naming a job absent from the schedule are ignored.
pub fn verify_precedence(
    schedule: &Schedule,
    edges: &[(JobId, JobId)],
) -> Vec<PrecedenceViolation> {
    edges
        .iter()
        .filter_map(|&(p, s)| {
            let (pred, succ) = (schedule.get(p)?, schedule.get(s)?);
            (succ.start < pred.end()).then(|| PrecedenceViolation {
                predecessor: p,
                successor: s,
                predecessor_end: pred.end(),
                successor_start: succ.start,
            })
        })
        .inspect(|v| warn!(predecessor = v.predecessor, successor = v.successor, "{v}"))
        .collect()
}

/// Capacity and precedence checks of a canonical schedule against the
/// instance it was solved from.
pub fn verify_schedule(schedule: &Schedule, instance: &ProjectInstance) -> FeasibilityReport {
    let capacities: BTreeMap<String, i64> = instance
        .resources
        .iter()
        .map(|r| (r.name.clone(), r.capacity))
        .collect();
    let report = FeasibilityReport {
        overlaps: Vec::new(),
        capacity: verify_capacity(schedule, &capacities),
        precedence: verify_precedence(schedule, &instance.edges_by_id()),
    };
    log_summary(&report);
    report
}

/// Overlap check of a per-machine timeline.
pub fn verify_machines(timeline: &MachineTimeline) -> FeasibilityReport {
    let report = FeasibilityReport {
        overlaps: verify_timeline(timeline),
        ..Default::default()
    };
    log_summary(&report);
    report
}

fn log_summary(report: &FeasibilityReport) {
    if report.is_clean() {
        info!("feasibility check passed — no violations");
    } else {
        warn!(
            overlaps = report.overlaps.len(),
            capacity = report.capacity.len(),
            precedence = report.precedence.len(),
            "feasibility check found violations (advisory)"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;
    use crate::engine::{SerialSgsEngine, SolveEngine};
    use crate::model::ScheduleModelBuilder;
    use crate::schedule::{extract, ScheduledJob};

    fn op(job: usize, operation: usize, start: i64, duration: i64) -> TimelineOp {
        TimelineOp {
            job,
            operation,
            start,
            duration,
        }
    }

    fn scheduled(job_id: JobId, start: i64, duration: i64, usage: &[(&str, i64)]) -> ScheduledJob {
        ScheduledJob {
            start,
            job_id,
            duration,
            resource_usage: usage
                .iter()
                .map(|&(r, q)| (r.to_string(), q))
                .collect(),
        }
    }

    // ── verify_timeline ───────────────────────────────────────────────────────

    #[test]
    fn back_to_back_operations_do_not_overlap() {
        let timeline = MachineTimeline::from([(0, vec![op(1, 0, 3, 2), op(0, 0, 0, 3)])]);
        assert!(verify_timeline(&timeline).is_empty());
    }

    #[test]
    fn overlap_reports_machine_operations_and_interval() {
        let timeline = MachineTimeline::from([(2, vec![op(0, 1, 0, 5), op(1, 0, 3, 4)])]);
        let overlaps = verify_timeline(&timeline);
        assert_eq!(overlaps.len(), 1);
        let o = &overlaps[0];
        assert_eq!(o.machine, 2);
        assert_eq!((o.previous.job, o.previous.operation), (0, 1));
        assert_eq!((o.current.job, o.current.operation), (1, 0));
        assert_eq!((o.from, o.to), (3, 5));
    }

    #[test]
    fn contained_operation_overlap_ends_with_inner_operation() {
        let timeline = MachineTimeline::from([(0, vec![op(0, 0, 0, 10), op(1, 0, 2, 3)])]);
        let overlaps = verify_timeline(&timeline);
        assert_eq!((overlaps[0].from, overlaps[0].to), (2, 5));
    }

    #[test]
    fn only_consecutive_pairs_are_compared() {
        // 0 overlaps 1 and 2, but only (0,1) and (1,2) are consecutive.
        let ops = vec![op(0, 0, 0, 10), op(1, 0, 1, 1), op(2, 0, 5, 1)];
        let timeline = MachineTimeline::from([(0, ops)]);
        let overlaps = verify_timeline(&timeline);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].current.job, 1);
    }

    #[test]
    fn overlap_display_names_both_operations() {
        let timeline = MachineTimeline::from([(1, vec![op(0, 0, 0, 4), op(3, 2, 2, 4)])]);
        let text = verify_timeline(&timeline)[0].to_string();
        assert_eq!(
            text,
            "machine 1: job 0 op 0 [0,4) overlaps job 3 op 2 [2,6) during [2,4)"
        );
    }

    // ── verify_capacity ───────────────────────────────────────────────────────

    #[test]
    fn load_within_capacity_passes() {
        let schedule = Schedule::new(
            vec![scheduled(0, 0, 4, &[("R1", 1)]), scheduled(1, 0, 4, &[("R1", 1)])],
            4,
        );
        let caps = BTreeMap::from([("R1".to_string(), 2)]);
        assert!(verify_capacity(&schedule, &caps).is_empty());
    }

    #[test]
    fn load_above_capacity_is_reported_with_active_jobs() {
        let schedule = Schedule::new(
            vec![scheduled(0, 0, 4, &[("R1", 2)]), scheduled(1, 2, 4, &[("R1", 1)])],
            6,
        );
        let caps = BTreeMap::from([("R1".to_string(), 2)]);
        let v = verify_capacity(&schedule, &caps);
        assert_eq!(v.len(), 1);
        assert_eq!((v[0].at, v[0].load, v[0].capacity), (2, 3, 2));
        assert_eq!(v[0].jobs, vec![0, 1]);
    }

    #[test]
    fn unknown_resource_is_unconstrained() {
        let schedule = Schedule::new(vec![scheduled(0, 0, 4, &[("R9", 100)])], 4);
        assert!(verify_capacity(&schedule, &BTreeMap::new()).is_empty());
    }

    // ── verify_precedence ─────────────────────────────────────────────────────

    #[test]
    fn successor_starting_early_is_reported() {
        let schedule = Schedule::new(vec![scheduled(0, 0, 3, &[]), scheduled(1, 2, 2, &[])], 4);
        let v = verify_precedence(&schedule, &[(0, 1)]);
        assert_eq!(
            v,
            vec![PrecedenceViolation {
                predecessor: 0,
                successor: 1,
                predecessor_end: 3,
                successor_start: 2,
            }]
        );
    }

    #[test]
    fn successor_starting_at_predecessor_end_is_fine() {
        let schedule = Schedule::new(vec![scheduled(0, 0, 3, &[]), scheduled(1, 3, 2, &[])], 5);
        assert!(verify_precedence(&schedule, &[(0, 1)]).is_empty());
    }

    // ── Report ────────────────────────────────────────────────────────────────

    #[test]
    fn report_counts_every_finding() {
        let timeline = MachineTimeline::from([(0, vec![op(0, 0, 0, 5), op(1, 0, 3, 4)])]);
        let report = verify_machines(&timeline);
        assert!(!report.is_clean());
        assert_eq!(report.violation_count(), 1);
        assert!(report.to_string().starts_with("1 violation(s) detected:"));
    }

    #[test]
    fn clean_report_says_so() {
        let text = FeasibilityReport::default().to_string();
        assert_eq!(text, "No violations detected.\n");
    }

    // ── Solved schedules ──────────────────────────────────────────────────────

    const RCPSP: &str = "\
# Precedence relations
1 1 2 2 3
2 1 1 4
3 1 1 4
4 1 1 5
5 1 0
# Duration and resources
1 1 2 1 1
2 1 3 1 0
3 1 4 1 1
4 1 2 2 1
5 1 1 0 1
# Resource availability
R1 2
R2 1
";

    #[test]
    fn engine_schedules_satisfy_precedence_and_capacity_everywhere() {
        let inst = ProjectInstance::from_dataset(&parse_dataset(RCPSP).unwrap()).unwrap();
        let model = ScheduleModelBuilder::new(&inst)
            .build(inst.total_duration())
            .unwrap();
        let outcome = SerialSgsEngine::default().solve(&model);
        let schedule = extract(&model, &inst, &outcome).unwrap();

        // Precedence, edge by edge.
        for (p, s) in inst.edges_by_id() {
            let (pred, succ) = (schedule.get(p).unwrap(), schedule.get(s).unwrap());
            assert!(succ.start >= pred.start + pred.duration, "edge {p}→{s}");
        }
        // Capacity, at every integer instant.
        for r in &inst.resources {
            for t in 0..schedule.makespan() {
                let load: i64 = schedule
                    .entries()
                    .iter()
                    .filter(|j| j.start <= t && t < j.end())
                    .map(|j| j.resource_usage.get(&r.name).copied().unwrap_or(0))
                    .sum();
                assert!(load <= r.capacity, "{} at t={t}: {load}", r.name);
            }
        }
        assert!(verify_schedule(&schedule, &inst).is_clean());
    }

    #[test]
    fn extracted_schedule_has_no_overlap_per_resource() {
        let inst = ProjectInstance::from_dataset(&parse_dataset(RCPSP).unwrap()).unwrap();
        let model = ScheduleModelBuilder::new(&inst).build(50).unwrap();
        let outcome = SerialSgsEngine::default().solve(&model);
        let schedule = extract(&model, &inst, &outcome).unwrap();

        // R2 has capacity 1, so its users form a unary machine timeline.
        let groups = schedule.by_resource();
        let users = &groups["R2"];
        let ops: Vec<_> = users
            .iter()
            .map(|j| op(j.job_id, 0, j.start, j.duration))
            .collect();
        let timeline = MachineTimeline::from([(0, ops)]);
        assert!(verify_timeline(&timeline).is_empty());
    }
}
