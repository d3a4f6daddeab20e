//! Error type shared by the lint, compile, and write stages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running the styles task.
///
/// `LintFailed`, `Pattern`, and `NoSources` abort the task. `CompileFailed`
/// and `Write` are attributed to a single file and collected in the
/// [`BuildReport`](crate::pipeline::BuildReport) while the remaining files
/// keep flowing through the pipeline.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("lint failed with {errors} error(s) and {warnings} warning(s)")]
    LintFailed { errors: usize, warnings: usize },

    #[error("failed to compile {}: {message}", file.display())]
    CompileFailed { file: PathBuf, message: String },

    #[error("failed to write {}: {source}", file.display())]
    Write {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no source patterns configured; pass --src or set [styles].src")]
    NoSources,
}

impl BuildError {
    /// File the error is attributed to, for per-file failures.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            BuildError::CompileFailed { file, .. } | BuildError::Write { file, .. } => {
                Some(file.as_path())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
