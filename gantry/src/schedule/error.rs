/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use thiserror::Error;

use crate::engine::SolveStatus;
use crate::job::JobId;

/// Reasons a solve outcome cannot be turned into a canonical schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The engine did not report OPTIMAL or FEASIBLE, or returned no valuation.
    #[error("no solution to extract (engine status {0})")]
    NoSolution(SolveStatus),

    #[error("valuation has no value for variable '{var}'")]
    MissingValue { var: String },

    /// The model's job variables do not line up with the instance's jobs.
    #[error("model job {job} does not match the project instance")]
    UnknownJob { job: JobId },
}
