/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use thiserror::Error;

/// Hard failures while reading result, mapping or instance text.
///
/// Dimension mismatches between machine lists and operation lists are *not*
/// errors; they are reconciled (see [`reconcile`](super::mapping::reconcile)).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResultFormatError {
    #[error("result file is empty — expected a makespan on the first line")]
    Empty,

    #[error("line {line}: makespan '{value}' is not an integer")]
    BadMakespan { line: usize, value: String },

    #[error("line {line}: malformed operation token '{token}'")]
    MalformedPair { line: usize, token: String },

    #[error("line {line}: machine index '{token}' is not a non-negative integer")]
    BadMachineIndex { line: usize, token: String },

    /// Start-times-only results carry no durations of their own.
    #[error("result lists bare start times — a JSS instance is needed for the durations")]
    DurationsRequired,

    #[error("job {job} operation {operation} is not present in the JSS instance")]
    MissingInstanceOperation { job: usize, operation: usize },

    #[error("JSS instance header must be '<jobs> <machines>', got '{0}'")]
    BadInstanceHeader(String),

    #[error("line {line}: JSS instance line must be 'machine duration' integer pairs")]
    BadInstanceLine { line: usize },

    #[error("JSS instance declares {expected} job(s) but lists {found}")]
    InstanceTruncated { expected: usize, found: usize },
}
