//! The styles task: enumerate → lint → compile → write.
//!
//! Lint is all-or-nothing: a single error-severity issue aborts the run
//! before anything is compiled or written. Compile and write failures are
//! per file; they are logged and collected while the other files proceed.

use crate::compile::{output_path, Compiler};
use crate::error::{BuildError, Result};
use crate::lint::run_lint;
use crate::models::task::{CompileConfiguration, LintConfiguration, SourceGlob};
use crate::models::LintResult;
use crate::sources::{self, SourceFile};
use crate::utils::display_path;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
/// A source written to the destination directory.
pub struct CompiledFile {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Default)]
/// Outcome of a task run that got past linting.
pub struct BuildReport {
    pub lint: LintResult,
    pub compiled: Vec<CompiledFile>,
    /// `CompileFailed` and `Write` errors, one per affected file.
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fully-configured styles task.
pub struct StyleTask {
    pub root: PathBuf,
    pub sources: SourceGlob,
    pub lint: LintConfiguration,
    pub compile: CompileConfiguration,
    pub dest: PathBuf,
}

impl StyleTask {
    /// Enumerate the configured sources.
    pub fn files(&self) -> Result<Vec<SourceFile>> {
        if self.sources.patterns.is_empty() {
            return Err(BuildError::NoSources);
        }
        sources::enumerate(&self.root, &self.sources.patterns)
    }

    /// Run only the lint stage.
    pub fn lint(&self) -> Result<LintResult> {
        let files = self.files()?;
        run_lint(&self.root, &files, &self.lint)
    }

    /// Run the whole task. `on_lint` receives the findings before the
    /// fail-on-error decision so they are displayed either way.
    pub fn run(&self, on_lint: impl FnOnce(&LintResult)) -> Result<BuildReport> {
        let files = self.files()?;
        if files.is_empty() {
            tracing::warn!("no stylesheets matched {:?}", self.sources.patterns);
        }

        let lint = run_lint(&self.root, &files, &self.lint)?;
        on_lint(&lint);
        if lint.has_errors() {
            return Err(BuildError::LintFailed {
                errors: lint.summary.errors,
                warnings: lint.summary.warnings,
            });
        }

        let dest = self.root.join(&self.dest);
        let compiler = Compiler::new(&self.compile);
        let mut report = BuildReport {
            lint,
            ..BuildReport::default()
        };
        for file in files.iter().filter(|f| !f.is_partial()) {
            match self.compile_one(&compiler, &dest, file) {
                Ok(compiled) => report.compiled.push(compiled),
                Err(err) => {
                    if self.compile.log_errors {
                        tracing::error!("{}", err);
                    }
                    report.failures.push(err);
                }
            }
        }
        tracing::info!(
            "compiled {} stylesheet(s) into {} ({} failed)",
            report.compiled.len(),
            display_path(&self.root, &dest),
            report.failures.len()
        );
        Ok(report)
    }

    fn compile_one(&self, compiler: &Compiler, dest: &Path, file: &SourceFile) -> Result<CompiledFile> {
        tracing::info!(
            "Compiling \"{}\" into CSS",
            display_path(&self.root, &file.path)
        );
        let css = compiler.compile_file(&file.path)?;
        let output = output_path(dest, file);
        let write = |target: &Path| -> std::io::Result<()> {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, css.as_bytes())
        };
        write(&output).map_err(|source| BuildError::Write {
            file: output.clone(),
            source,
        })?;
        Ok(CompiledFile {
            source: file.path.clone(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::OutputStyle;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn put(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    fn task(root: &Path) -> StyleTask {
        StyleTask {
            root: root.to_path_buf(),
            sources: SourceGlob {
                patterns: vec!["styles/**/*.scss".into()],
            },
            lint: LintConfiguration::default(),
            compile: CompileConfiguration::default(),
            dest: PathBuf::from("dist/css"),
        }
    }

    #[test]
    fn test_clean_sources_are_compiled_to_dest() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, "styles/_vars.scss", "$fg: red;\n");
        put(
            root,
            "styles/main.scss",
            "@import 'vars';\n\n.main {\n  color: $fg;\n}\n",
        );
        put(root, "styles/pages/home.scss", ".home {\n  margin: 0;\n}\n");

        let seen = Cell::new(false);
        let report = task(root).run(|_| seen.set(true)).unwrap();
        assert!(seen.get());
        assert!(report.is_clean());
        assert_eq!(report.compiled.len(), 2);
        assert_eq!(
            fs::read_to_string(root.join("dist/css/main.css")).unwrap(),
            ".main {\n  color: red;\n}\n"
        );
        assert!(root.join("dist/css/pages/home.css").exists());
        // partials are never written on their own
        assert!(!root.join("dist/css/_vars.css").exists());
    }

    #[test]
    fn test_lint_error_aborts_before_compiling() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, ".sass-lint.yml", "rules:\n  no-ids: 2\n");
        put(root, "styles/ok.scss", ".ok {\n  color: red;\n}\n");
        put(root, "styles/bad.scss", "#bad {\n  color: red;\n}\n");

        let mut shown = None;
        let err = task(root)
            .run(|lint| shown = Some(lint.summary.clone()))
            .unwrap_err();
        assert!(matches!(err, BuildError::LintFailed { errors: 1, .. }));
        assert_eq!(shown.map(|s| s.errors), Some(1));
        assert!(!root.join("dist").exists());
    }

    #[test]
    fn test_ignored_violations_do_not_fail_the_build() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, ".sass-lint.yml", "rules:\n  no-important: 2\n");
        put(
            root,
            "styles/base/_normalize.scss",
            "html { line-height: 1.15 !important; }\n",
        );
        put(
            root,
            "styles/main.scss",
            "@import 'base/normalize';\n\n.main {\n  color: red;\n}\n",
        );

        let report = task(root).run(|_| {}).unwrap();
        assert_eq!(report.lint.summary.files, 1);
        assert!(report.lint.issues.is_empty());
        assert!(root.join("dist/css/main.css").exists());
    }

    #[test]
    fn test_compile_failure_does_not_stop_other_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, "styles/a.scss", ".a {\n  color: red;\n}\n");
        put(root, "styles/broken.scss", ".b {\n  color: $missing;\n}\n");
        put(root, "styles/c.scss", ".c {\n  color: blue;\n}\n");

        let report = task(root).run(|_| {}).unwrap();
        assert_eq!(report.compiled.len(), 2);
        assert_eq!(report.failures.len(), 1);
        let failed = report.failures[0].file().unwrap();
        assert!(failed.ends_with("styles/broken.scss"));
        assert!(root.join("dist/css/a.css").exists());
        assert!(root.join("dist/css/c.css").exists());
        assert!(!root.join("dist/css/broken.css").exists());
    }

    #[test]
    fn test_compressed_style_is_applied() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, "styles/a.scss", ".a {\n  color: red;\n}\n");
        let mut t = task(root);
        t.compile.style = OutputStyle::Compressed;
        t.run(|_| {}).unwrap();
        let css = fs::read_to_string(root.join("dist/css/a.css")).unwrap();
        assert!(!css.trim_end().contains('\n'));
        assert!(css.contains("color:red"));
    }

    #[test]
    fn test_no_patterns_is_an_error() {
        let dir = tempdir().unwrap();
        let mut t = task(dir.path());
        t.sources.patterns.clear();
        assert!(matches!(t.run(|_| {}), Err(BuildError::NoSources)));
    }
}
