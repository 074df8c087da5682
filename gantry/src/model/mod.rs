/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Declarative makespan model handed to the solving engine.
//!
//! [`ScheduleModelBuilder`] translates a [`ProjectInstance`] into a
//! [`ScheduleModel`]:
//!
//! | Element | Per | Meaning |
//! |---|---|---|
//! | `start_j`, `end_j` | job | integer variables in `[0, horizon]` |
//! | interval | job | `end_j = start_j + duration_j` |
//! | `makespan` | model | `makespan = max_j end_j`, in `[0, horizon]` |
//! | precedence | edge `p → s` | `start_s ≥ end_p` |
//! | cumulative | resource with demand | Σ demand of active intervals ≤ capacity |
//! | objective | model | minimise `makespan` |
//!
//! The builder does no search.  The model it emits is satisfiable if and only
//! if a schedule meeting every precedence and capacity constraint exists within
//! the horizon.

pub mod error;

pub use error::ModelError;

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::job::{JobId, ProjectInstance};

// ── Variables ─────────────────────────────────────────────────────────────────

/// Handle to an integer variable of a [`ScheduleModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

/// Bounded integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    pub name: String,
    pub lower: i64,
    pub upper: i64,
}

/// Fixed-length interval linking a start and an end variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub name: String,
    pub start: VarId,
    pub end: VarId,
    pub duration: i64,
}

// ── Constraints & objective ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `after ≥ before`.
    Precedence { before: VarId, after: VarId },

    /// At every instant, the summed demand of the active intervals does not
    /// exceed `capacity`.  `intervals[i]` indexes [`ScheduleModel::intervals`]
    /// and pairs with `demands[i]`.
    Cumulative {
        resource: String,
        intervals: Vec<usize>,
        demands: Vec<i64>,
        capacity: i64,
    },

    /// `target = max(operands)`.
    MaxEquality { target: VarId, operands: Vec<VarId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize(VarId),
}

/// Variables created for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobVars {
    pub job: JobId,
    pub start: VarId,
    pub end: VarId,
    /// Index into [`ScheduleModel::intervals`].
    pub interval: usize,
}

// ── Valuation ─────────────────────────────────────────────────────────────────

/// Assignment of values to model variables, as returned by an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Valuation {
    values: BTreeMap<VarId, i64>,
}

impl Valuation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, var: VarId, value: i64) {
        self.values.insert(var, value);
    }

    pub fn get(&self, var: VarId) -> Option<i64> {
        self.values.get(&var).copied()
    }

    pub fn remove(&mut self, var: VarId) -> Option<i64> {
        self.values.remove(&var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ── ScheduleModel ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleModel {
    name: String,
    horizon: i64,
    vars: Vec<IntVar>,
    intervals: Vec<Interval>,
    constraints: Vec<Constraint>,
    jobs: Vec<JobVars>,
    makespan: VarId,
    objective: Objective,
}

impl ScheduleModel {
    fn empty(name: String, horizon: i64) -> Self {
        Self {
            name,
            horizon,
            vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            jobs: Vec::new(),
            makespan: VarId(0),
            objective: Objective::Minimize(VarId(0)),
        }
    }

    fn new_var(&mut self, name: String, lower: i64, upper: i64) -> VarId {
        self.vars.push(IntVar { name, lower, upper });
        VarId(self.vars.len() - 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    pub fn var(&self, id: VarId) -> &IntVar {
        &self.vars[id.0]
    }

    pub fn vars(&self) -> &[IntVar] {
        &self.vars
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn job_vars(&self) -> &[JobVars] {
        &self.jobs
    }

    pub fn makespan(&self) -> VarId {
        self.makespan
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn precedence_count(&self) -> usize {
        self.constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Precedence { .. }))
            .count()
    }

    pub fn cumulative_count(&self) -> usize {
        self.constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Cumulative { .. }))
            .count()
    }

    /// Check a valuation against every bound, interval, and constraint.
    ///
    /// Returns a human-readable description of each violation; an empty vector
    /// means the valuation is a solution of the model.
    pub fn violations(&self, v: &Valuation) -> Vec<String> {
        let mut out = Vec::new();
        let value = |id: VarId| v.get(id);

        for (idx, var) in self.vars.iter().enumerate() {
            match value(VarId(idx)) {
                None => out.push(format!("{} has no value", var.name)),
                Some(x) if x < var.lower || x > var.upper => out.push(format!(
                    "{} = {x} outside [{}, {}]",
                    var.name, var.lower, var.upper
                )),
                Some(_) => {}
            }
        }
        if !out.is_empty() {
            return out;
        }
        // Every variable has a value from here on.
        let val = |id: VarId| v.get(id).unwrap_or_default();

        for iv in &self.intervals {
            if val(iv.end) != val(iv.start) + iv.duration {
                out.push(format!("{}: end ≠ start + {}", iv.name, iv.duration));
            }
        }

        for c in &self.constraints {
            match c {
                Constraint::Precedence { before, after } => {
                    if val(*after) < val(*before) {
                        out.push(format!(
                            "{} < {}",
                            self.var(*after).name,
                            self.var(*before).name
                        ));
                    }
                }
                Constraint::MaxEquality { target, operands } => {
                    let max = operands.iter().map(|&o| val(o)).max().unwrap_or(0);
                    if val(*target) != max {
                        out.push(format!("{} ≠ max of operands ({max})", self.var(*target).name));
                    }
                }
                Constraint::Cumulative {
                    resource,
                    intervals,
                    demands,
                    capacity,
                } => {
                    // Load only increases at interval starts.
                    for &i in intervals {
                        let t = val(self.intervals[i].start);
                        let load: i64 = intervals
                            .iter()
                            .zip(demands)
                            .filter(|&(&k, _)| {
                                let iv = &self.intervals[k];
                                val(iv.start) <= t && t < val(iv.end)
                            })
                            .map(|(_, &d)| d)
                            .sum();
                        if load > *capacity {
                            out.push(format!(
                                "{resource}: load {load} > capacity {capacity} at t={t}"
                            ));
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    pub fn is_satisfied_by(&self, v: &Valuation) -> bool {
        self.violations(v).is_empty()
    }
}

/// Compact textual dump, one declaration per line.
impl fmt::Display for ScheduleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "% model {} (horizon {})", self.name, self.horizon)?;
        for var in &self.vars {
            writeln!(f, "var {} in {}..{};", var.name, var.lower, var.upper)?;
        }
        for iv in &self.intervals {
            writeln!(
                f,
                "interval {} = ({}, {}, {});",
                iv.name,
                self.var(iv.start).name,
                iv.duration,
                self.var(iv.end).name
            )?;
        }
        for c in &self.constraints {
            match c {
                Constraint::Precedence { before, after } => writeln!(
                    f,
                    "constraint {} >= {};",
                    self.var(*after).name,
                    self.var(*before).name
                )?,
                Constraint::Cumulative {
                    resource,
                    intervals,
                    demands,
                    capacity,
                } => {
                    let terms: Vec<String> = intervals
                        .iter()
                        .zip(demands)
                        .map(|(&i, d)| format!("{}*{d}", self.intervals[i].name))
                        .collect();
                    writeln!(
                        f,
                        "constraint cumulative({resource}, [{}], {capacity});",
                        terms.join(", ")
                    )?
                }
                Constraint::MaxEquality { target, operands } => {
                    let names: Vec<&str> = operands
                        .iter()
                        .map(|&o| self.var(o).name.as_str())
                        .collect();
                    writeln!(
                        f,
                        "constraint {} = max({});",
                        self.var(*target).name,
                        names.join(", ")
                    )?
                }
            }
        }
        match self.objective {
            Objective::Minimize(v) => writeln!(f, "solve minimize {};", self.var(v).name),
        }
    }
}

// ── ScheduleModelBuilder ──────────────────────────────────────────────────────

/// Builds a [`ScheduleModel`] from a [`ProjectInstance`].
///
/// # Example
/// ```rust
/// use gantry::dataset::parse_dataset;
/// use gantry::job::ProjectInstance;
/// use gantry::model::ScheduleModelBuilder;
///
/// let text = "# Duration and resources\n1 1 3 1\n2 1 2 1\n# Resource availability\nR1 1\n";
/// let instance = ProjectInstance::from_dataset(&parse_dataset(text).unwrap()).unwrap();
/// let model = ScheduleModelBuilder::new(&instance).build(10).unwrap();
/// assert_eq!(model.job_vars().len(), 2);
/// assert_eq!(model.cumulative_count(), 1);
/// ```
#[derive(Debug)]
pub struct ScheduleModelBuilder<'a> {
    instance: &'a ProjectInstance,
    name: String,
}

impl<'a> ScheduleModelBuilder<'a> {
    pub fn new(instance: &'a ProjectInstance) -> Self {
        Self {
            instance,
            name: String::from("rcpsp"),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build the model for the given `horizon`.
    ///
    /// # Errors
    /// [`ModelError::InvalidHorizon`] if `horizon < 0`.
    pub fn build(&self, horizon: i64) -> Result<ScheduleModel, ModelError> {
        if horizon < 0 {
            return Err(ModelError::InvalidHorizon(horizon));
        }
        let jobs = &self.instance.jobs;
        let mut model = ScheduleModel::empty(self.name.clone(), horizon);

        // ── Start / end / interval per job ────────────────────────────────────
        for job in jobs {
            let start = model.new_var(format!("start_{}", job.number), 0, horizon);
            let end = model.new_var(format!("end_{}", job.number), 0, horizon);
            model.intervals.push(Interval {
                name: job.display_name(),
                start,
                end,
                duration: job.duration,
            });
            model.jobs.push(JobVars {
                job: job.id,
                start,
                end,
                interval: model.intervals.len() - 1,
            });
        }

        // ── Makespan objective ────────────────────────────────────────────────
        let makespan = model.new_var(String::from("makespan"), 0, horizon);
        let ends: Vec<VarId> = model.jobs.iter().map(|jv| jv.end).collect();
        model.constraints.push(Constraint::MaxEquality {
            target: makespan,
            operands: ends,
        });
        model.makespan = makespan;
        model.objective = Objective::Minimize(makespan);

        // ── Precedence ────────────────────────────────────────────────────────
        for &(pred, succ) in self.instance.precedence.edges() {
            model.constraints.push(Constraint::Precedence {
                before: model.jobs[pred].end,
                after: model.jobs[succ].start,
            });
        }

        // ── Cumulative resources ──────────────────────────────────────────────
        for resource in &self.instance.resources {
            let (intervals, demands): (Vec<usize>, Vec<i64>) = jobs
                .iter()
                .enumerate()
                .map(|(pos, job)| (model.jobs[pos].interval, job.demand(&resource.name)))
                .filter(|&(_, d)| d > 0)
                .unzip();
            if intervals.is_empty() {
                debug!(resource = %resource.name, "no demand — cumulative constraint skipped");
                continue;
            }
            model.constraints.push(Constraint::Cumulative {
                resource: resource.name.clone(),
                intervals,
                demands,
                capacity: resource.capacity,
            });
        }

        info!(
            model = %model.name,
            horizon,
            jobs = model.jobs.len(),
            vars = model.vars.len(),
            precedence = model.precedence_count(),
            cumulative = model.cumulative_count(),
            "schedule model built"
        );
        Ok(model)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
