/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Serial schedule-generation scheme (SGS).
//!
//! # Algorithm
//!
//! 1. Read jobs, precedence edges and cumulative constraints back out of the
//!    [`ScheduleModel`].
//! 2. Reject trivially infeasible models (single demand above capacity, lower
//!    bound above the horizon).
//! 3. Repeatedly pick the highest-priority *eligible* job (all predecessors
//!    placed) and place it at the earliest instant that is ≥ every
//!    predecessor's end and keeps every resource profile within capacity.
//!
//! # Status
//!
//! | Condition | Status |
//! |---|---|
//! | demand > capacity, or lower bound > horizon | `INFEASIBLE` |
//! | cyclic precedence, or greedy makespan > horizon | `UNKNOWN` |
//! | makespan == lower bound | `OPTIMAL` |
//! | otherwise | `FEASIBLE` |
//!
//! The lower bound is `max(critical path, max_r ⌈Σ dur·demand_r / cap_r⌉)`.
//!
//! # Complexity
//! O(n² · r · k) where n=jobs, r=resources, k=placed jobs per resource.
//!
//! # Reference
//! Kolisch (1996), "Serial and parallel resource-constrained project
//! scheduling methods revisited".

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{SolveEngine, SolveOutcome, SolveStatus};
use crate::job::PrecedenceGraph;
use crate::model::{Constraint, ScheduleModel, Valuation};

// ── Priority rules ────────────────────────────────────────────────────────────

/// Order in which eligible jobs are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRule {
    /// Longest remaining path (own duration + longest successor chain) first.
    #[default]
    LatestFinish,
    /// Shortest processing time first.
    ShortestDuration,
    /// Model order, i.e. ascending job number.
    InputOrder,
}

// ── Model view ────────────────────────────────────────────────────────────────

/// One cumulative constraint, re-indexed by job position.
#[derive(Debug)]
struct Pool<'m> {
    name: &'m str,
    capacity: i64,
    /// `demand[j]`, zero for jobs outside the constraint.
    demand: Vec<i64>,
}

/// The parts of a model the SGS needs, indexed by interval position.
#[derive(Debug)]
struct Problem<'m> {
    durations: Vec<i64>,
    graph: PrecedenceGraph,
    pools: Vec<Pool<'m>>,
}

impl<'m> Problem<'m> {
    fn from_model(model: &'m ScheduleModel) -> Self {
        let intervals = model.intervals();
        let n = intervals.len();
        let durations = intervals.iter().map(|iv| iv.duration).collect();

        let start_of: BTreeMap<_, _> = intervals
            .iter()
            .enumerate()
            .map(|(i, iv)| (iv.start, i))
            .collect();
        let end_of: BTreeMap<_, _> = intervals
            .iter()
            .enumerate()
            .map(|(i, iv)| (iv.end, i))
            .collect();

        let mut edges = Vec::new();
        let mut pools = Vec::new();
        for c in model.constraints() {
            match c {
                Constraint::Precedence { before, after } => {
                    match (end_of.get(before), start_of.get(after)) {
                        (Some(&p), Some(&s)) => edges.push((p, s)),
                        _ => debug!(?before, ?after, "precedence not between intervals — ignored"),
                    }
                }
                Constraint::Cumulative {
                    resource,
                    intervals: members,
                    demands,
                    capacity,
                } => {
                    let mut demand = vec![0; n];
                    for (&i, &d) in members.iter().zip(demands) {
                        demand[i] += d;
                    }
                    pools.push(Pool {
                        name: resource,
                        capacity: *capacity,
                        demand,
                    });
                }
                Constraint::MaxEquality { .. } => {}
            }
        }

        Self {
            durations,
            graph: PrecedenceGraph::new(n, edges),
            pools,
        }
    }

    fn len(&self) -> usize {
        self.durations.len()
    }

    /// Longest path ending at each job's completion, given a topological order.
    fn earliest_finish(&self, order: &[usize]) -> Vec<i64> {
        let mut finish = vec![0; self.len()];
        for &j in order {
            let ready = self
                .graph
                .predecessors(j)
                .map(|p| finish[p])
                .max()
                .unwrap_or(0);
            finish[j] = ready + self.durations[j];
        }
        finish
    }

    /// Longest path from each job's start to the end of the project.
    fn tail(&self, order: &[usize]) -> Vec<i64> {
        let mut tail = self.durations.clone();
        for &j in order.iter().rev() {
            let longest_succ = self
                .graph
                .edges()
                .iter()
                .filter(|&&(p, _)| p == j)
                .map(|&(_, s)| tail[s])
                .max()
                .unwrap_or(0);
            tail[j] = self.durations[j] + longest_succ;
        }
        tail
    }

    fn energy_bound(&self) -> i64 {
        self.pools
            .iter()
            .filter(|pool| pool.capacity > 0)
            .map(|pool| {
                let energy: i64 = pool
                    .demand
                    .iter()
                    .zip(&self.durations)
                    .map(|(&d, &dur)| d * dur)
                    .sum();
                (energy + pool.capacity - 1) / pool.capacity
            })
            .max()
            .unwrap_or(0)
    }
}

// ── Resource profile ──────────────────────────────────────────────────────────

/// `(start, end, demand)` of every job placed on one pool.
type Profile = Vec<(i64, i64, i64)>;

fn load_at(profile: &Profile, t: i64) -> i64 {
    profile
        .iter()
        .filter(|&&(s, e, _)| s <= t && t < e)
        .map(|&(_, _, d)| d)
        .sum()
}

/// Whether `demand` fits on `profile` throughout `[t, t + duration)`.
///
/// The load only rises at placed starts, so checking `t` and every placed start
/// inside the window is enough.
fn fits(profile: &Profile, capacity: i64, demand: i64, t: i64, duration: i64) -> bool {
    if demand == 0 || duration == 0 {
        return true;
    }
    std::iter::once(t)
        .chain(
            profile
                .iter()
                .map(|&(s, _, _)| s)
                .filter(|&s| t < s && s < t + duration),
        )
        .all(|p| load_at(profile, p) + demand <= capacity)
}

// ── SerialSgsEngine ───────────────────────────────────────────────────────────

/// Greedy priority-list engine; see the module docs for the status rules.
///
/// # Example
/// ```rust
/// use gantry::dataset::parse_dataset;
/// use gantry::engine::{SerialSgsEngine, SolveEngine, SolveStatus};
/// use gantry::job::ProjectInstance;
/// use gantry::model::ScheduleModelBuilder;
///
/// let text = concat!(
///     "# Precedence relations\n1 1 1 2\n2 1 0\n",
///     "# Duration and resources\n1 1 3 1\n2 1 2 1\n",
///     "# Resource availability\nR1 1\n",
/// );
/// let instance = ProjectInstance::from_dataset(&parse_dataset(text).unwrap()).unwrap();
/// let model = ScheduleModelBuilder::new(&instance).build(10).unwrap();
/// let outcome = SerialSgsEngine::default().solve(&model);
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SerialSgsEngine {
    rule: PriorityRule,
}

impl SerialSgsEngine {
    pub fn new(rule: PriorityRule) -> Self {
        Self { rule }
    }

    /// Placement order key: smaller sorts first, ties by position.
    fn keys(&self, problem: &Problem<'_>, order: &[usize]) -> Vec<i64> {
        match self.rule {
            PriorityRule::LatestFinish => problem.tail(order).into_iter().map(|t| -t).collect(),
            PriorityRule::ShortestDuration => problem.durations.clone(),
            PriorityRule::InputOrder => vec![0; problem.len()],
        }
    }

    /// Serial placement; returns the start of every job, or `None` if no
    /// start satisfies the pools (only possible with a malformed model).
    fn place(&self, problem: &Problem<'_>, order: &[usize]) -> Option<Vec<i64>> {
        let n = problem.len();
        let keys = self.keys(problem, order);
        let mut start: Vec<Option<i64>> = vec![None; n];
        let mut profiles: Vec<Profile> = vec![Vec::new(); problem.pools.len()];

        for _ in 0..n {
            let j = (0..n)
                .filter(|&j| start[j].is_none())
                .filter(|&j| problem.graph.predecessors(j).all(|p| start[p].is_some()))
                .min_by_key(|&j| (keys[j], j))?;

            let dur = problem.durations[j];
            let ready = problem
                .graph
                .predecessors(j)
                .filter_map(|p| start[p].map(|s| s + problem.durations[p]))
                .max()
                .unwrap_or(0);

            let candidates: BTreeSet<i64> = std::iter::once(ready)
                .chain(
                    profiles
                        .iter()
                        .flatten()
                        .map(|&(_, e, _)| e)
                        .filter(|&e| e > ready),
                )
                .collect();
            let t = candidates.into_iter().find(|&t| {
                problem
                    .pools
                    .iter()
                    .zip(&profiles)
                    .all(|(pool, profile)| fits(profile, pool.capacity, pool.demand[j], t, dur))
            })?;

            for (pool, profile) in problem.pools.iter().zip(profiles.iter_mut()) {
                if pool.demand[j] > 0 && dur > 0 {
                    profile.push((t, t + dur, pool.demand[j]));
                }
            }
            start[j] = Some(t);
        }

        start.into_iter().collect()
    }
}

impl SolveEngine for SerialSgsEngine {
    fn name(&self) -> &str {
        "serial-sgs"
    }

    fn solve(&self, model: &ScheduleModel) -> SolveOutcome {
        let problem = Problem::from_model(model);
        let horizon = model.horizon();

        // ── Trivial infeasibility ─────────────────────────────────────────────
        for pool in &problem.pools {
            let overloaded = |j: usize| pool.demand[j] > pool.capacity && problem.durations[j] > 0;
            if let Some(j) = (0..problem.len()).find(|&j| overloaded(j)) {
                info!(
                    resource = pool.name,
                    demand = pool.demand[j],
                    capacity = pool.capacity,
                    "single job exceeds capacity — INFEASIBLE"
                );
                return SolveOutcome::unsolved(SolveStatus::Infeasible);
            }
        }

        let Some(order) = problem.graph.topological_order() else {
            warn!("precedence graph has a cycle — UNKNOWN");
            return SolveOutcome::unsolved(SolveStatus::Unknown);
        };

        let critical_path = problem
            .earliest_finish(&order)
            .into_iter()
            .max()
            .unwrap_or(0);
        let lower_bound = critical_path.max(problem.energy_bound());
        if lower_bound > horizon {
            info!(
                lower_bound,
                horizon,
                "lower bound exceeds horizon — INFEASIBLE"
            );
            return SolveOutcome::unsolved(SolveStatus::Infeasible);
        }

        // ── Placement ─────────────────────────────────────────────────────────
        let Some(starts) = self.place(&problem, &order) else {
            warn!("no placement satisfies the resource pools — UNKNOWN");
            return SolveOutcome::unsolved(SolveStatus::Unknown);
        };

        let makespan = starts
            .iter()
            .zip(&problem.durations)
            .map(|(s, d)| s + d)
            .max()
            .unwrap_or(0);
        if makespan > horizon {
            info!(
                makespan,
                horizon,
                "greedy schedule exceeds horizon — UNKNOWN"
            );
            return SolveOutcome::unsolved(SolveStatus::Unknown);
        }

        let mut valuation = Valuation::new();
        for (iv, &s) in model.intervals().iter().zip(&starts) {
            valuation.set(iv.start, s);
            valuation.set(iv.end, s + iv.duration);
        }
        valuation.set(model.makespan(), makespan);

        let violations = model.violations(&valuation);
        if !violations.is_empty() {
            warn!(
                count = violations.len(),
                first = %violations[0],
                "greedy valuation violates the model — UNKNOWN"
            );
            return SolveOutcome::unsolved(SolveStatus::Unknown);
        }

        let status = if makespan == lower_bound {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };
        info!(
            engine = self.name(),
            rule = ?self.rule,
            makespan,
            lower_bound,
            %status,
            "solve finished"
        );
        SolveOutcome::solved(status, valuation)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;
    use crate::job::ProjectInstance;
    use crate::model::ScheduleModelBuilder;

    fn model(text: &str, horizon: i64) -> ScheduleModel {
        let inst = ProjectInstance::from_dataset(&parse_dataset(text).unwrap()).unwrap();
        ScheduleModelBuilder::new(&inst).build(horizon).unwrap()
    }

    fn starts(model: &ScheduleModel, outcome: &SolveOutcome) -> Vec<i64> {
        let v = outcome.valuation.as_ref().unwrap();
        model
            .job_vars()
            .iter()
            .map(|jv| v.get(jv.start).unwrap())
            .collect()
    }

    const CHAIN: &str = "\
# Precedence relations
1 1 1 2
2 1 0
# Duration and resources
1 1 3 1
2 1 2 1
# Resource availability
R1 1
";

    /// Three independent jobs on a capacity-2 pool, demands 1/1/2.
    const PARALLEL: &str = "\
# Duration and resources
1 1 4 1
2 1 4 1
3 1 2 2
# Resource availability
R1 2
";

    #[test]
    fn chain_is_solved_optimally() {
        let m = model(CHAIN, 10);
        let outcome = SerialSgsEngine::default().solve(&m);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(starts(&m, &outcome), vec![0, 3]);
        let v = outcome.valuation.unwrap();
        assert_eq!(v.get(m.makespan()), Some(5));
    }

    #[test]
    fn parallel_jobs_share_capacity() {
        let m = model(PARALLEL, 20);
        let outcome = SerialSgsEngine::default().solve(&m);
        assert!(outcome.status.has_solution());
        let s = starts(&m, &outcome);
        // Jobs 1 and 2 run together, job 3 needs the whole pool.
        assert_eq!(s[0], s[1]);
        assert!(s[2] >= s[0] + 4 || s[2] + 2 <= s[0], "starts {s:?}");
        assert_eq!(
            outcome.status,
            SolveStatus::Optimal,
            "energy bound (4+4+4)/2 = 6"
        );
    }

    #[test]
    fn demand_above_capacity_is_infeasible() {
        let text = "# Duration and resources\n1 1 3 5\n# Resource availability\nR1 4\n";
        let outcome = SerialSgsEngine::default().solve(&model(text, 100));
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.valuation.is_none());
    }

    #[test]
    fn horizon_below_critical_path_is_infeasible() {
        let outcome = SerialSgsEngine::default().solve(&model(CHAIN, 4));
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn horizon_equal_to_optimum_is_enough() {
        let outcome = SerialSgsEngine::default().solve(&model(CHAIN, 5));
        assert_eq!(outcome.status, SolveStatus::Optimal);
    }

    #[test]
    fn cyclic_precedence_is_unknown() {
        let text = "\
# Precedence relations
1 1 1 2
2 1 1 1
# Duration and resources
1 1 1
2 1 1
";
        let outcome = SerialSgsEngine::default().solve(&model(text, 10));
        assert_eq!(outcome.status, SolveStatus::Unknown);
    }

    #[test]
    fn every_rule_returns_a_model_solution() {
        let m = model(PARALLEL, 20);
        let rules = [
            PriorityRule::LatestFinish,
            PriorityRule::ShortestDuration,
            PriorityRule::InputOrder,
        ];
        for rule in rules {
            let outcome = SerialSgsEngine::new(rule).solve(&m);
            let v = outcome.valuation.as_ref().unwrap();
            assert!(m.is_satisfied_by(v), "{rule:?}: {:?}", m.violations(v));
        }
    }

    #[test]
    fn shortest_duration_places_short_job_first() {
        let m = model(PARALLEL, 20);
        let outcome = SerialSgsEngine::new(PriorityRule::ShortestDuration).solve(&m);
        assert_eq!(starts(&m, &outcome), vec![2, 2, 0]);
    }

    #[test]
    fn zero_duration_jobs_do_not_occupy_resources() {
        let text = "# Duration and resources\n1 1 0 1\n2 1 3 1\n# Resource availability\nR1 1\n";
        let m = model(text, 10);
        let outcome = SerialSgsEngine::default().solve(&m);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.valuation.unwrap().get(m.makespan()), Some(3));
    }

    #[test]
    fn zero_length_project_fits_zero_horizon() {
        let text = "# Duration and resources\n1 1 0\n";
        let m = model(text, 0);
        let outcome = SerialSgsEngine::default().solve(&m);
        assert_eq!(outcome.status, SolveStatus::Optimal);
    }

    #[test]
    fn priority_rule_deserialises_from_snake_case() {
        let rule: PriorityRule = serde_yaml::from_str("shortest_duration").unwrap();
        assert_eq!(rule, PriorityRule::ShortestDuration);
    }
}
