/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Gantry – project / job-shop scheduling pipeline
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── dataset/      – sectioned dataset text → ParsedDataset
//! ├── job.rs        – jobs, resources, precedence graph
//! ├── model/        – ScheduleModelBuilder: variables, constraints, objective
//! ├── engine/       – SolveEngine seam + serial SGS reference engine
//! ├── schedule/     – canonical Schedule, extractor, text report
//! ├── results/      – externally solved result files, machine mappings, JSS instances
//! ├── feasibility/  – overlap / capacity / precedence checks (advisory)
//! ├── config/       – YAML pipeline configuration
//! └── pipeline/     – parse → build → solve → extract → verify
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod feasibility;
pub mod job;
pub mod model;
pub mod pipeline;
pub mod results;
pub mod schedule;
