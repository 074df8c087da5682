/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use thiserror::Error;

/// Hard failures of [`parse_dataset`](super::parse_dataset).
///
/// Lines with a wrong field count or non-numeric fields are *not* errors;
/// they are skipped and recorded in
/// [`ParsedDataset::skipped_lines`](super::ParsedDataset::skipped_lines).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// A duration/resource row carries a different number of resource columns
    /// than the first row of the section, so the positional `R1..Rn` labels
    /// cannot be assigned unambiguously.
    #[error(
        "line {line}: duration/resource row has {found} resource column(s), \
         expected {expected} (derived from the first row)"
    )]
    InconsistentResourceColumns {
        line: usize,
        expected: usize,
        found: usize,
    },
}
