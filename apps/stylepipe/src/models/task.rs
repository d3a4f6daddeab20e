//! Task configuration records handed to the lint and compile stages.

use serde::Deserialize;
use std::path::PathBuf;

/// Ignore pattern applied when nothing else is configured.
pub const DEFAULT_IGNORE: &str = "**/_normalize.scss";
/// Rule file looked up relative to the repository root.
pub const DEFAULT_RULE_FILE: &str = ".sass-lint.yml";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Glob patterns selecting the stylesheets that participate in a run.
pub struct SourceGlob {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Linter settings: files to skip and where the rule file lives.
pub struct LintConfiguration {
    pub ignore: Vec<String>,
    pub rule_file: PathBuf,
}

impl Default for LintConfiguration {
    fn default() -> Self {
        LintConfiguration {
            ignore: vec![DEFAULT_IGNORE.to_string()],
            rule_file: PathBuf::from(DEFAULT_RULE_FILE),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// CSS output formatting.
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl std::str::FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expanded" | "nested" => Ok(OutputStyle::Expanded),
            "compressed" | "compact" => Ok(OutputStyle::Compressed),
            other => Err(format!(
                "unknown output style '{}' (expected expanded|compressed)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Compiler settings.
pub struct CompileConfiguration {
    pub style: OutputStyle,
    pub source_map: bool,
    pub log_errors: bool,
}

impl Default for CompileConfiguration {
    fn default() -> Self {
        CompileConfiguration {
            style: OutputStyle::Expanded,
            source_map: false,
            log_errors: true,
        }
    }
}
