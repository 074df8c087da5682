/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Solving-engine seam.
//!
//! The pipeline never searches for a schedule itself.  It hands a
//! [`ScheduleModel`] to a [`SolveEngine`] and gets back a [`SolveOutcome`]:
//!
//! | Status | Valuation | Pipeline reaction |
//! |---|---|---|
//! | `OPTIMAL` | every variable | extract + verify |
//! | `FEASIBLE` | every variable | extract + verify |
//! | `INFEASIBLE` | none | status surfaced, no schedule |
//! | `UNKNOWN` | none | status surfaced, no schedule |
//!
//! [`SerialSgsEngine`] is the engine shipped with the crate.  Any other
//! optimiser can be plugged in by implementing the trait.

pub mod sgs;

pub use sgs::{PriorityRule, SerialSgsEngine};

use std::fmt;

use serde::Serialize;

use crate::model::{ScheduleModel, Valuation};

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    /// `true` for the two statuses that come with a valuation.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Present only when `status.has_solution()`.
    pub valuation: Option<Valuation>,
}

impl SolveOutcome {
    pub fn solved(status: SolveStatus, valuation: Valuation) -> Self {
        Self {
            status,
            valuation: Some(valuation),
        }
    }

    pub fn unsolved(status: SolveStatus) -> Self {
        Self {
            status,
            valuation: None,
        }
    }
}

// ── Engine trait ──────────────────────────────────────────────────────────────

/// A blocking, black-box optimiser.
///
/// Time and iteration budgets belong to the implementation; the caller only
/// sees the outcome.
pub trait SolveEngine {
    fn name(&self) -> &str;

    fn solve(&self, model: &ScheduleModel) -> SolveOutcome;
}

// ── Test fake ─────────────────────────────────────────────────────────────────
