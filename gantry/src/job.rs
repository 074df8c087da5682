/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scheduling entities built from a parsed dataset.
//!
//! ```text
//! dataset text ──(parse_dataset)──► ParsedDataset ──(ProjectInstance::from_dataset)──► ProjectInstance
//!                                    ↑ positional records                               ↑ jobs, resources, precedence graph
//! ```
//!
//! # Ownership model
//! A `ProjectInstance` is created once per pipeline run, borrowed read-only by
//! the model builder and the extractor, and dropped with the run.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::{ParsedDataset, Section};
use crate::model::ModelError;

/// Zero-based job index (`jobnr - 1`).
pub type JobId = usize;

// ── Resource kind ─────────────────────────────────────────────────────────────

/// Resource category as declared in the general-information section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Renewable,
    Nonrenewable,
    DoublyConstrained,
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// A single activity of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// 1-based job number as written in the dataset.
    pub number: u32,
    pub duration: i64,
    /// Demand per resource label.  Zero entries are kept so every job carries
    /// the full label set.
    pub demands: BTreeMap<String, i64>,
}

impl Job {
    /// Demand on `resource`, `0` if the job does not mention it.
    pub fn demand(&self, resource: &str) -> i64 {
        self.demands.get(resource).copied().unwrap_or(0)
    }

    /// Only the strictly positive demands.
    pub fn positive_demands(&self) -> BTreeMap<String, i64> {
        self.demands
            .iter()
            .filter(|&(_, &q)| q > 0)
            .map(|(r, &q)| (r.clone(), q))
            .collect()
    }

    pub fn display_name(&self) -> String {
        format!("job_{}", self.number)
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub capacity: i64,
    pub kind: ResourceKind,
}

// ── Precedence graph ──────────────────────────────────────────────────────────

/// Directed `pred → succ` edges over positions in [`ProjectInstance::jobs`].
///
/// Acyclicity is **not** checked on construction; [`topological_order`]
/// returns `None` when a cycle exists.
///
/// [`topological_order`]: PrecedenceGraph::topological_order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceGraph {
    job_count: usize,
    edges: Vec<(JobId, JobId)>,
}

impl PrecedenceGraph {
    pub fn new(job_count: usize, edges: Vec<(JobId, JobId)>) -> Self {
        Self { job_count, edges }
    }

    pub fn edges(&self) -> &[(JobId, JobId)] {
        &self.edges
    }

    pub fn predecessors(&self, job: JobId) -> impl Iterator<Item = JobId> + '_ {
        self.edges
            .iter()
            .filter(move |&&(_, s)| s == job)
            .map(|&(p, _)| p)
    }

    /// Kahn's algorithm; ties resolved by lowest job id.
    pub fn topological_order(&self) -> Option<Vec<JobId>> {
        let mut indegree = vec![0usize; self.job_count];
        let mut out: Vec<Vec<JobId>> = vec![Vec::new(); self.job_count];
        for &(p, s) in &self.edges {
            indegree[s] += 1;
            out[p].push(s);
        }

        let mut ready: VecDeque<JobId> = (0..self.job_count)
            .filter(|&j| indegree[j] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.job_count);
        while let Some(j) = ready.pop_front() {
            order.push(j);
            for &s in &out[j] {
                indegree[s] -= 1;
                if indegree[s] == 0 {
                    ready.push_back(s);
                }
            }
        }

        (order.len() == self.job_count).then_some(order)
    }
}

// ── ProjectInstance ───────────────────────────────────────────────────────────

/// Jobs, resources and precedence edges of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInstance {
    /// Sorted by job number.  `jobs[i].id` is `jobnr - 1`, which is *not*
    /// necessarily `i` when job numbers are sparse.
    pub jobs: Vec<Job>,
    pub resources: Vec<Resource>,
    pub precedence: PrecedenceGraph,
    /// Horizon declared in the general-information section, if any.
    pub declared_horizon: Option<i64>,
}

impl ProjectInstance {
    /// Build the entities from a parsed dataset.
    ///
    /// * A job number with several duration rows keeps the last one
    ///   (single-mode view); earlier modes are replaced.
    /// * Precedence edges are stored over *positions* in `jobs`.
    ///
    /// # Errors
    /// * [`ModelError::MissingSection`] – no duration/resource rows.
    /// * [`ModelError::InvalidJobNumber`] – a job numbered `0`.
    /// * [`ModelError::UnknownJob`] – a precedence row or successor names a job
    ///   without a duration row.
    /// * [`ModelError::NegativeDuration`] / [`ModelError::NegativeQuantity`].
    pub fn from_dataset(data: &ParsedDataset) -> Result<Self, ModelError> {
        if data.is_section_empty(Section::DurationResources) {
            return Err(ModelError::MissingSection(Section::DurationResources));
        }

        // ── Jobs ──────────────────────────────────────────────────────────────
        let mut by_number: BTreeMap<u32, Job> = BTreeMap::new();
        for row in &data.durations {
            if row.jobnr == 0 {
                return Err(ModelError::InvalidJobNumber);
            }
            if row.duration < 0 {
                return Err(ModelError::NegativeDuration {
                    job: row.jobnr,
                    duration: row.duration,
                });
            }
            let mut demands = BTreeMap::new();
            for label in &data.resource_labels {
                let quantity = data.demand(row, label);
                if quantity < 0 {
                    return Err(ModelError::NegativeQuantity {
                        job: row.jobnr,
                        resource: label.clone(),
                        quantity,
                    });
                }
                demands.insert(label.clone(), quantity);
            }
            let job = Job {
                id: row.jobnr as JobId - 1,
                number: row.jobnr,
                duration: row.duration,
                demands,
            };
            if by_number.insert(row.jobnr, job).is_some() {
                debug!(
                    job = row.jobnr,
                    mode = row.mode,
                    "later mode replaces earlier one"
                );
            }
        }

        let position: BTreeMap<u32, usize> = by_number
            .keys()
            .enumerate()
            .map(|(pos, &nr)| (nr, pos))
            .collect();
        let jobs: Vec<Job> = by_number.into_values().collect();

        // ── Precedence ────────────────────────────────────────────────────────
        let lookup = |nr: u32| {
            position.get(&nr).copied().ok_or(ModelError::UnknownJob {
                job: nr,
                section: Section::Precedence,
            })
        };
        let mut edges = Vec::new();
        for row in &data.precedence {
            let pred = lookup(row.jobnr)?;
            for &succ_nr in &row.successors {
                let succ = lookup(succ_nr)?;
                edges.push((pred, succ));
            }
        }

        // ── Resources ─────────────────────────────────────────────────────────
        let resources: Vec<Resource> = data
            .availability
            .iter()
            .map(|a| Resource {
                name: a.resource.clone(),
                capacity: a.quantity,
                kind: kind_of(data, &a.resource),
            })
            .collect();
        for label in &data.resource_labels {
            let demanded = jobs.iter().any(|j| j.demand(label) > 0);
            if demanded && !resources.iter().any(|r| &r.name == label) {
                warn!(
                    resource = %label,
                    "resource is demanded but has no availability entry — left unconstrained"
                );
            }
        }

        Ok(Self {
            precedence: PrecedenceGraph::new(jobs.len(), edges),
            jobs,
            resources,
            declared_horizon: data.general_info.horizon,
        })
    }

    /// Sum of all durations: a horizon every precedence-feasible serial
    /// schedule fits in.
    pub fn total_duration(&self) -> i64 {
        self.jobs.iter().map(|j| j.duration).sum()
    }

    /// Precedence edges translated from positions to [`JobId`]s.
    pub fn edges_by_id(&self) -> Vec<(JobId, JobId)> {
        self.precedence
            .edges()
            .iter()
            .map(|&(p, s)| (self.jobs[p].id, self.jobs[s].id))
            .collect()
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Kind of the resource labelled `name`, by its column position and the
/// declared counts (renewable columns first, then nonrenewable, then doubly
/// constrained).  Falls back to renewable.
fn kind_of(data: &ParsedDataset, name: &str) -> ResourceKind {
    let Some(pos) = data.resource_labels.iter().position(|l| l == name) else {
        return ResourceKind::Renewable;
    };
    let counts = &data.general_info.resource_counts;
    let count = |kind: ResourceKind| counts.get(&kind).copied().unwrap_or(0) as usize;
    let renewable = count(ResourceKind::Renewable);
    let nonrenewable = count(ResourceKind::Nonrenewable);
    let doubly = count(ResourceKind::DoublyConstrained);

    if pos < renewable {
        ResourceKind::Renewable
    } else if pos < renewable + nonrenewable {
        ResourceKind::Nonrenewable
    } else if pos < renewable + nonrenewable + doubly {
        ResourceKind::DoublyConstrained
    } else {
        ResourceKind::Renewable
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;

    fn instance(text: &str) -> Result<ProjectInstance, ModelError> {
        ProjectInstance::from_dataset(&parse_dataset(text).unwrap())
    }

    const TWO_JOBS: &str = "\
# Precedence relations
1 1 1 2
2 1 0
# Duration and resources
1 1 3 1
2 1 2 1
# Resource availability
R1 1
";

    #[test]
    fn two_job_instance_has_expected_entities() {
        let inst = instance(TWO_JOBS).unwrap();
        assert_eq!(inst.jobs.len(), 2);
        assert_eq!(inst.jobs[0].id, 0);
        assert_eq!(inst.jobs[1].duration, 2);
        assert_eq!(inst.precedence.edges(), &[(0, 1)]);
        assert_eq!(inst.edges_by_id(), vec![(0, 1)]);
        assert_eq!(inst.resources.len(), 1);
        assert_eq!(inst.resources[0].capacity, 1);
        assert_eq!(inst.resources[0].kind, ResourceKind::Renewable);
        assert_eq!(inst.total_duration(), 5);
    }

    #[test]
    fn missing_duration_section_is_fatal() {
        let err = instance("# Precedence relations\n1 1 0\n").unwrap_err();
        assert_eq!(err, ModelError::MissingSection(Section::DurationResources));
    }

    #[test]
    fn successor_without_duration_row_is_unknown_job() {
        let text = "# Precedence relations\n1 1 1 7\n# Duration and resources\n1 1 3\n";
        let err = instance(text).unwrap_err();
        assert!(matches!(err, ModelError::UnknownJob { job: 7, .. }));
    }

    #[test]
    fn last_mode_of_a_job_wins() {
        let text = "# Duration and resources\n1 1 3 1\n1 2 9 0\n";
        let inst = instance(text).unwrap();
        assert_eq!(inst.jobs.len(), 1);
        assert_eq!(inst.jobs[0].duration, 9);
        assert_eq!(inst.jobs[0].demand("R1"), 0);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = instance("# Duration and resources\n1 1 -3\n").unwrap_err();
        assert!(matches!(err, ModelError::NegativeDuration { job: 1, duration: -3 }));
    }

    #[test]
    fn job_number_zero_is_rejected() {
        let err = instance("# Duration and resources\n0 1 3\n").unwrap_err();
        assert_eq!(err, ModelError::InvalidJobNumber);
    }

    #[test]
    fn resource_kind_follows_declared_counts() {
        let text = "\
# General Information
  - renewable : 1 R
  - nonrenewable : 1 N
# Duration and resources
1 1 3 1 4
# Resource availability
R1 2
R2 10
";
        let inst = instance(text).unwrap();
        assert_eq!(inst.resource("R1").unwrap().kind, ResourceKind::Renewable);
        let r2 = inst.resource("R2").unwrap();
        assert_eq!(r2.kind, ResourceKind::Nonrenewable);
    }

    #[test]
    fn positive_demands_drop_zero_entries() {
        let text = "# Duration and resources\n1 1 3 0 2\n";
        let inst = instance(text).unwrap();
        let usage = inst.jobs[0].positive_demands();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage.get("R2"), Some(&2));
    }

    // ── PrecedenceGraph ───────────────────────────────────────────────────────

    #[test]
    fn topological_order_respects_edges() {
        let g = PrecedenceGraph::new(4, vec![(2, 0), (0, 1), (3, 1)]);
        let order = g.topological_order().unwrap();
        let pos = |j| order.iter().position(|&x| x == j).unwrap();
        assert!(pos(2) < pos(0));
        assert!(pos(0) < pos(1));
        assert!(pos(3) < pos(1));
    }

    #[test]
    fn topological_order_detects_cycle() {
        let g = PrecedenceGraph::new(2, vec![(0, 1), (1, 0)]);
        assert!(g.topological_order().is_none());
    }

    #[test]
    fn predecessors_lists_incoming_edges() {
        let g = PrecedenceGraph::new(3, vec![(0, 2), (1, 2)]);
        let preds: Vec<_> = g.predecessors(2).collect();
        assert_eq!(preds, vec![0, 1]);
    }
}
