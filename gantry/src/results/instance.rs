/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Job-shop (JSS) instance files.
//!
//! ```text
//! 3 3            ← <jobs> <machines>
//! 0 12 2 7 1 30  ← job 0: (machine, duration) per operation
//! 1 4 0 19 2 8
//! 2 40 1 1 0 9
//! ```
//!
//! Blank lines are ignored.  An instance provides the durations for
//! start-times-only results and the machine of every operation.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use super::error::ResultFormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JssOperation {
    pub machine: usize,
    pub duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JssInstance {
    pub machines: usize,
    pub jobs: Vec<Vec<JssOperation>>,
}

impl JssInstance {
    pub fn parse(text: &str) -> Result<Self, ResultFormatError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| ResultFormatError::BadInstanceHeader(String::new()))?;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| ResultFormatError::BadInstanceHeader(header.to_string()))?;
        let [job_count, machines] = dims[..] else {
            return Err(ResultFormatError::BadInstanceHeader(header.to_string()));
        };

        let mut jobs = Vec::with_capacity(job_count);
        for (line, content) in lines {
            let nums: Vec<i64> = content
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| ResultFormatError::BadInstanceLine { line })?;
            if nums.len() % 2 != 0 {
                return Err(ResultFormatError::BadInstanceLine { line });
            }
            let ops = nums
                .chunks(2)
                .map(|pair| {
                    let Ok(machine) = usize::try_from(pair[0]) else {
                        return Err(ResultFormatError::BadInstanceLine { line });
                    };
                    if machine >= machines {
                        warn!(
                            line,
                            machine,
                            machines,
                            "operation uses a machine beyond the declared count"
                        );
                    }
                    Ok(JssOperation {
                        machine,
                        duration: pair[1],
                    })
                })
                .collect::<Result<Vec<_>, ResultFormatError>>()?;
            jobs.push(ops);
        }

        if jobs.len() < job_count {
            return Err(ResultFormatError::InstanceTruncated {
                expected: job_count,
                found: jobs.len(),
            });
        }
        if jobs.len() > job_count {
            debug!(
                declared = job_count,
                found = jobs.len(),
                "extra job lines ignored"
            );
            jobs.truncate(job_count);
        }

        Ok(Self { machines, jobs })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open JSS instance: {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Failed to parse JSS instance: {}", path.display()))
    }

    pub fn operation(&self, job: usize, operation: usize) -> Option<&JssOperation> {
        self.jobs.get(job)?.get(operation)
    }

    /// Machine of every operation, one row per job.
    pub fn machine_rows(&self) -> Vec<Vec<usize>> {
        self.jobs
            .iter()
            .map(|ops| ops.iter().map(|op| op.machine).collect())
            .collect()
    }
}

/// Serialises back to the file format.
impl fmt::Display for JssInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.jobs.len(), self.machines)?;
        for ops in &self.jobs {
            let pairs: Vec<String> = ops
                .iter()
                .map(|op| format!("{} {}", op.machine, op.duration))
                .collect();
            writeln!(f, "{}", pairs.join(" "))?;
        }
        Ok(())
    }
}
