/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Section tags and line classification for the dataset state machine.
//!
//! A dataset is a flat text file split into five groups by header lines:
//!
//! ```text
//! # General Information        → Section::GeneralInfo
//! # Projects summary           → Section::Projects
//! # Precedence relations       → Section::Precedence
//! # Duration and resources     → Section::DurationResources
//! # Resource availability      → Section::ResourceAvailability
//! ```
//!
//! Header recognition is a case-insensitive substring match on the marker
//! phrase.  A `#` line that matches no marker is ignored and leaves the
//! current section untouched.

use std::fmt;

// ── Section ───────────────────────────────────────────────────────────────────

/// One of the five named groups of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    GeneralInfo,
    Projects,
    Precedence,
    DurationResources,
    ResourceAvailability,
}

/// Marker phrases, lower-case.  Matched in order; the first hit wins.
const MARKERS: [(&str, Section); 5] = [
    ("general information", Section::GeneralInfo),
    ("projects summary", Section::Projects),
    ("precedence relations", Section::Precedence),
    ("duration and resources", Section::DurationResources),
    ("resource availability", Section::ResourceAvailability),
];

impl Section {
    /// Recognise a header line.  Returns `None` for lines that carry no known
    /// marker phrase.
    pub fn from_header(line: &str) -> Option<Self> {
        let lower = line.to_ascii_lowercase();
        MARKERS
            .iter()
            .find(|(marker, _)| lower.contains(marker))
            .map(|&(_, section)| section)
    }

    /// Stable snake_case name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Section::GeneralInfo => "general_info",
            Section::Projects => "projects",
            Section::Precedence => "precedence_relations",
            Section::DurationResources => "duration_resources",
            Section::ResourceAvailability => "resource_availability",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Parser state ──────────────────────────────────────────────────────────────

/// State of the dataset parser.
///
/// The only transitions are `Preamble → InSection(s)` and
/// `InSection(a) → InSection(b)`, both triggered exclusively by a recognised
/// header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Before the first recognised header.  Data lines are ignored.
    #[default]
    Preamble,
    InSection(Section),
}

impl ParseState {
    /// Apply a classified line to the state.
    pub fn transition(self, line: &LineKind<'_>) -> Self {
        match line {
            LineKind::Header(Some(section)) => ParseState::InSection(*section),
            _ => self,
        }
    }

    pub fn section(self) -> Option<Section> {
        match self {
            ParseState::Preamble => None,
            ParseState::InSection(s) => Some(s),
        }
    }
}

// ── Line classification ───────────────────────────────────────────────────────

/// Lexical category of a single (trimmed) dataset line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// `*`-prefixed separator / comment line.
    Comment,
    /// `#`-prefixed header line; `None` when no marker phrase matched.
    Header(Option<Section>),
    Data(&'a str),
}

impl<'a> LineKind<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            LineKind::Blank
        } else if line.starts_with('*') {
            LineKind::Comment
        } else if line.starts_with('#') {
            LineKind::Header(Section::from_header(line))
        } else {
            LineKind::Data(line)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
