//! Lint runner for stylesheet sources.
//!
//! Loads the rule file, drops ignored files before they are read, runs the
//! enabled rules over every remaining file, and produces a `LintResult`
//! with issues and a summary. Error-severity issues fail the build upstream.

use crate::error::Result;
use crate::models::rule_file::{OneOrMany, RuleFile};
use crate::models::task::LintConfiguration;
use crate::models::{Issue, LintResult, Severity};
use crate::rules::{self, ConfiguredRule, Source};
use crate::sources::{IgnoreSet, SourceFile};
use crate::utils::display_path;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Lint `files` with the rules configured for `root`.
///
/// A missing rule file means "defaults only". An unreadable or malformed
/// rule file is reported as a single error issue so the build stops.
pub fn run_lint(root: &Path, files: &[SourceFile], cfg: &LintConfiguration) -> Result<LintResult> {
    let rule_path = root.join(&cfg.rule_file);
    let rule_file = match load_rule_file(root, &rule_path) {
        Ok(rf) => rf,
        Err(issue) => return Ok(LintResult::from_issues(vec![issue], 0)),
    };

    let mut ignore = cfg.ignore.clone();
    ignore.extend(
        rule_file
            .files
            .ignore
            .as_ref()
            .map(OneOrMany::to_vec)
            .unwrap_or_default(),
    );
    let ignore = IgnoreSet::new(&ignore)?;

    let targets: Vec<&SourceFile> = files
        .iter()
        .filter(|f| {
            let skip = ignore.is_ignored(root, &f.path);
            if skip {
                tracing::debug!("lint skips ignored file {}", display_path(root, &f.path));
            }
            !skip
        })
        .collect();

    let enabled = rules::resolve(&rule_file);
    tracing::debug!(
        "linting {} file(s) with {} rule(s)",
        targets.len(),
        enabled.len()
    );

    let per_file: Vec<Vec<Issue>> = targets
        .par_iter()
        .map(|f| lint_file(root, &f.path, &enabled))
        .collect();

    // Deterministic ordering of issues by file, then position
    let mut issues: Vec<Issue> = per_file.into_iter().flatten().collect();
    issues.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then(a.rule.cmp(&b.rule))
    });
    Ok(LintResult::from_issues(issues, targets.len()))
}

fn load_rule_file(root: &Path, path: &Path) -> std::result::Result<RuleFile, Issue> {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(
                "rule file {} not found; using default rules",
                display_path(root, path)
            );
            return Ok(RuleFile::default());
        }
        Err(e) => {
            return Err(config_issue(
                root,
                path,
                "load-config",
                format!("Rule file could not be read: {}", e),
            ))
        }
    };
    if text.trim().is_empty() {
        return Ok(RuleFile::default());
    }
    serde_yaml::from_str::<RuleFile>(&text).map_err(|e| {
        config_issue(
            root,
            path,
            "parse-config",
            format!("Rule file is not valid YAML: {}", e),
        )
    })
}

fn config_issue(root: &Path, path: &Path, rule: &str, message: String) -> Issue {
    Issue {
        file: display_path(root, path),
        rule: rule.into(),
        severity: Severity::Error,
        line: 1,
        column: 1,
        message,
    }
}

/// Lint a single file against every enabled rule.
fn lint_file(root: &Path, path: &Path, enabled: &[ConfiguredRule]) -> Vec<Issue> {
    let file = display_path(root, path);
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            return vec![Issue {
                file,
                rule: "read-file".into(),
                severity: Severity::Error,
                line: 1,
                column: 1,
                message: format!("File could not be read: {}", e),
            }]
        }
    };
    let src = Source::scan(&text);
    let mut out = Vec::new();
    for cr in enabled {
        for f in cr.rule.check(&src) {
            out.push(Issue {
                file: file.clone(),
                rule: cr.rule.name().to_string(),
                severity: cr.severity,
                line: f.line,
                column: f.column,
                message: f.message,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, body: &str) -> SourceFile {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, body).unwrap();
        SourceFile {
            path: p,
            base: root.to_path_buf(),
        }
    }

    #[test]
    fn test_clean_file_has_no_issues() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let files = vec![write(root, "a.scss", ".a {\n  color: red;\n}\n")];
        let res = run_lint(root, &files, &LintConfiguration::default()).unwrap();
        assert!(res.issues.is_empty());
        assert_eq!(res.summary.files, 1);
        assert!(!res.has_errors());
    }

    #[test]
    fn test_rule_file_severity_drives_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".sass-lint.yml"), "rules:\n  no-ids: 2\n").unwrap();
        let files = vec![
            write(root, "b.scss", "#b {\n  color: red;\n}\n"),
            write(root, "a.scss", "#a {\n  margin: 0px;\n}\n"),
        ];
        let res = run_lint(root, &files, &LintConfiguration::default()).unwrap();
        assert_eq!(res.summary.errors, 2);
        assert_eq!(res.summary.warnings, 1);
        // sorted by file
        assert_eq!(res.issues[0].file, "a.scss");
        assert_eq!(res.issues.last().unwrap().file, "b.scss");
    }

    #[test]
    fn test_ignored_file_is_never_linted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let files = vec![
            write(root, "base/_normalize.scss", "a { color: red !important; }\n"),
            write(root, "vendor/lib.scss", "a { color: red !important; }\n"),
            write(root, "main.scss", ".a {\n  color: red;\n}\n"),
        ];
        let cfg = LintConfiguration::default();
        fs::write(
            root.join(".sass-lint.yml"),
            "files:\n  ignore:\n    - 'vendor/**/*.scss'\nrules:\n  no-important: 2\n",
        )
        .unwrap();
        let res = run_lint(root, &files, &cfg).unwrap();
        assert!(res.issues.is_empty());
        assert_eq!(res.summary.files, 1);
    }

    #[test]
    fn test_invalid_rule_file_is_an_error_issue() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("lint.yml"), "rules: [unclosed\n").unwrap();
        let files = vec![write(root, "a.scss", ".a {\n  color: red;\n}\n")];
        let cfg = LintConfiguration {
            ignore: vec![],
            rule_file: PathBuf::from("lint.yml"),
        };
        let res = run_lint(root, &files, &cfg).unwrap();
        assert!(res.has_errors());
        assert_eq!(res.issues[0].rule, "parse-config");
        assert_eq!(res.summary.files, 0);
    }
}
