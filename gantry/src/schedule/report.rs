/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Plain-text schedule report.
//!
//! ```text
//! Optimal Schedule Length: 5
//! Resource jobs:
//!   job_1           [0,3]
//!   job_2           [3,5]
//!
//! Resource R1:
//!   job_1           [0,3]
//!   job_2           [3,5]
//!
//! Status: OPTIMAL
//! ```
//!
//! The `jobs` block lists every job; one further block follows per resource
//! that at least one job uses.

use std::fmt;

use super::{Schedule, ScheduledJob};
use crate::engine::SolveStatus;

pub const DEFAULT_NAME_WIDTH: usize = 15;

/// Renders a [`Schedule`] via `Display`.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    schedule: &'a Schedule,
    status: SolveStatus,
    name_width: usize,
}

impl<'a> Report<'a> {
    pub fn new(schedule: &'a Schedule, status: SolveStatus) -> Self {
        Self {
            schedule,
            status,
            name_width: DEFAULT_NAME_WIDTH,
        }
    }

    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    fn block<'j>(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        jobs: impl IntoIterator<Item = &'j ScheduledJob>,
    ) -> fmt::Result {
        writeln!(f, "Resource {title}:")?;
        for job in jobs {
            writeln!(
                f,
                "  {:<width$} [{},{}]",
                job.name(),
                job.start,
                job.end(),
                width = self.name_width
            )?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = match self.status {
            SolveStatus::Optimal => "Optimal Schedule Length",
            _ => "Schedule Length",
        };
        writeln!(f, "{heading}: {}", self.schedule.makespan())?;

        self.block(f, "jobs", self.schedule.entries())?;
        for (resource, jobs) in self.schedule.by_resource() {
            self.block(f, resource, jobs)?;
        }

        writeln!(f, "Status: {}", self.status)
    }
}
