/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Errors raised while turning parsed records into a schedule model.
//!
//! Every variant is fatal for the run: without a valid model there is nothing
//! to hand to the solving engine.

use thiserror::Error;

use crate::dataset::Section;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A dataset group the model needs is empty.
    #[error("required dataset section '{0}' is empty — the model cannot be built")]
    MissingSection(Section),

    /// A job number is referenced but has no duration/resource row.
    #[error("job {job} referenced in {section} has no duration/resource row")]
    UnknownJob { job: u32, section: Section },

    /// Job numbers are 1-based; `0` cannot be mapped to a job id.
    #[error("job number 0 is invalid — job numbers start at 1")]
    InvalidJobNumber,

    #[error("job {job} has negative duration {duration}")]
    NegativeDuration { job: u32, duration: i64 },

    #[error("job {job} demands {quantity} of resource '{resource}' — demands must be ≥ 0")]
    NegativeQuantity {
        job: u32,
        resource: String,
        quantity: i64,
    },

    #[error("horizon {0} is negative")]
    InvalidHorizon(i64),
}
