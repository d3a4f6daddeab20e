//! Shared data models for task configuration, lint findings, and the
//! sass-lint rule file.

pub mod rule_file;
pub mod task;

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
/// Severity of a lint finding. Only `Error` fails the build.
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Map a sass-lint severity number (0 off, 1 warning, 2 error).
    pub fn from_level(level: u8) -> Option<Severity> {
        match level {
            0 => None,
            1 => Some(Severity::Warning),
            _ => Some(Severity::Error),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
/// A single lint issue with severity and location.
pub struct Issue {
    pub file: String,
    pub rule: String,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
/// Aggregated lint summary used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub files: usize,
}

#[derive(Serialize, Debug, Default, Clone)]
/// Lint results container.
pub struct LintResult {
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

impl LintResult {
    /// Build a result from issues, counting severities.
    pub fn from_issues(issues: Vec<Issue>, files: usize) -> LintResult {
        let errors = issues
            .iter()
            .filter(|is| is.severity == Severity::Error)
            .count();
        let warnings = issues.len() - errors;
        LintResult {
            issues,
            summary: Summary {
                errors,
                warnings,
                files,
            },
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}
