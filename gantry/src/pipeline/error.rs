/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hard failures of a pipeline run.
//!
//! | Variant | Raised by | Typical cause |
//! |---|---|---|
//! | `Dataset` | [`parse_dataset`](crate::dataset::parse_dataset) | inconsistent resource columns |
//! | `Model` | instance / model construction | missing section, unknown job, negative horizon |
//! | `Extract` | [`extract`](crate::schedule::extract) | engine claimed a solution but a value is missing |
//!
//! An INFEASIBLE or UNKNOWN engine status is **not** an error; it is reported
//! through [`PipelineOutcome::status`](super::PipelineOutcome::status).

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::model::ModelError;
use crate::schedule::ExtractError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataset rejected: {0}")]
    Dataset(#[from] DatasetError),

    #[error("model cannot be built: {0}")]
    Model(#[from] ModelError),

    #[error("schedule cannot be extracted: {0}")]
    Extract(#[from] ExtractError),
}
