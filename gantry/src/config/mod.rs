//! Pipeline configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! horizon: 120            # optional; overrides the dataset horizon
//! priority: latest_finish # latest_finish | shortest_duration | input_order
//! report:
//!   name_width: 15
//! verify: true
//! ```
//!
//! Every key is optional.  A missing file is an error; an empty file yields the
//! defaults.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::engine::PriorityRule;
use crate::schedule::report::DEFAULT_NAME_WIDTH;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct PipelineConfigFile {
    #[serde(default)]
    horizon: Option<i64>,
    #[serde(default)]
    priority: PriorityRule,
    #[serde(default)]
    report: ReportSection,
    #[serde(default = "default_verify")]
    verify: bool,
}

#[derive(Debug, Deserialize)]
struct ReportSection {
    #[serde(default = "default_name_width")]
    name_width: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            name_width: DEFAULT_NAME_WIDTH,
        }
    }
}

fn default_verify() -> bool {
    true
}

fn default_name_width() -> usize {
    DEFAULT_NAME_WIDTH
}

// ── PipelineConfig ────────────────────────────────────────────────────────────

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Horizon override; `None` defers to the dataset.
    pub horizon: Option<i64>,
    /// Priority rule of the reference engine.
    pub priority: PriorityRule,
    /// Width of the job-name column in the text report.
    pub name_width: usize,
    /// Run the feasibility verifier after extraction.
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: None,
            priority: PriorityRule::default(),
            name_width: DEFAULT_NAME_WIDTH,
            verify: true,
        }
    }
}

impl PipelineConfig {
    /// Parses YAML text.  Blank text gives [`PipelineConfig::default`].
    ///
    /// # Errors
    /// Structurally invalid YAML, an unknown priority rule, or a zero
    /// `name_width`.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            debug!("empty configuration — using defaults");
            return Ok(Self::default());
        }
        let file: PipelineConfigFile = serde_yaml::from_str(content)
            .context("Failed to parse YAML configuration")?;
        if file.report.name_width == 0 {
            bail!("report.name_width must be at least 1");
        }
        Ok(Self {
            horizon: file.horizon,
            priority: file.priority,
            name_width: file.report.name_width,
            verify: file.verify,
        })
    }

    /// Reads and parses `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading pipeline configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        info!(
            horizon = ?config.horizon,
            priority = ?config.priority,
            name_width = config.name_width,
            verify = config.verify,
            "Pipeline configuration loaded"
        );
        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
