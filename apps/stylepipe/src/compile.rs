//! Compile SCSS to CSS.
//!
//! This module uses [`grass`] under the hood.

use crate::error::{BuildError, Result};
use crate::models::task::{CompileConfiguration, OutputStyle};
use crate::sources::SourceFile;
use std::path::{Path, PathBuf};

/// SCSS compiler configured once per run.
pub struct Compiler {
    style: grass::OutputStyle,
}

impl Compiler {
    pub fn new(cfg: &CompileConfiguration) -> Self {
        if cfg.source_map {
            tracing::warn!("source maps are not supported; sourceMap = true is ignored");
        }
        let style = match cfg.style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        Self { style }
    }

    fn options(&self, file: Option<&Path>) -> grass::Options<'static> {
        let mut options = grass::Options::default().style(self.style);
        if let Some(parent) = file.and_then(Path::parent) {
            options = options.load_path(parent);
        }
        options
    }

    /// Compile one file; failures are attributed to `path`.
    pub fn compile_file(&self, path: &Path) -> Result<String> {
        grass::from_path(path, &self.options(Some(path))).map_err(|error| {
            BuildError::CompileFailed {
                file: path.to_path_buf(),
                message: error.to_string(),
            }
        })
    }

    /// Compile a string from SCSS to CSS.
    pub fn compile_str(&self, input: &str) -> std::result::Result<String, Box<grass::Error>> {
        grass::from_string(input, &self.options(None))
    }
}

/// Destination of a compiled source: its layout below the glob base,
/// re-rooted at `dest`, with a `.css` extension.
pub fn output_path(dest: &Path, source: &SourceFile) -> PathBuf {
    dest.join(source.relative()).with_extension("css")
}
