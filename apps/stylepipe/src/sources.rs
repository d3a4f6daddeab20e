//! Source enumeration: expands the configured globs under the repository
//! root and applies ignore patterns.
//!
//! Patterns prefixed with `!` exclude matches of the positive patterns.
//! Every matched file remembers the glob base it came from so outputs can
//! mirror the source layout under the destination directory.

use crate::error::{BuildError, Result};
use glob::{glob, MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stylesheet selected for the run.
pub struct SourceFile {
    pub path: PathBuf,
    /// Directory the output layout is relative to.
    pub base: PathBuf,
}

impl SourceFile {
    /// Path below the glob base, e.g. `components/button.scss`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Partials (`_name.scss`) are only meant to be imported.
    pub fn is_partial(&self) -> bool {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'))
    }
}

/// Expand `patterns` relative to `root` in declaration order.
///
/// Files matched by several patterns are listed once, attributed to the
/// first pattern that matched them.
pub fn enumerate(root: &Path, patterns: &[String]) -> Result<Vec<SourceFile>> {
    if patterns.iter().all(|p| p.starts_with('!')) {
        return Err(BuildError::NoSources);
    }
    let negated = IgnoreSet::new(
        patterns
            .iter()
            .filter_map(|p| p.strip_prefix('!'))
            .map(str::to_string)
            .collect::<Vec<_>>()
            .as_slice(),
    )?;

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();
    for pat in patterns.iter().filter(|p| !p.starts_with('!')) {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|source| BuildError::Pattern {
            pattern: pat.clone(),
            source,
        })?;
        let base = root.join(glob_base(pat));
        for entry in entries {
            let entry = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(
                        "skipping unreadable path {}: {}",
                        e.path().display(),
                        e.error()
                    );
                    continue;
                }
            };
            if !entry.is_file() {
                continue;
            }
            if negated.is_ignored(root, &entry) {
                tracing::debug!("excluded by negated pattern: {}", entry.display());
                continue;
            }
            if seen.insert(entry.clone()) {
                files.push(SourceFile {
                    path: entry,
                    base: base.clone(),
                });
            }
        }
    }
    Ok(files)
}

/// Leading directory of `pattern` that contains no glob metacharacters.
///
/// `src/styles/**/*.scss` has base `src/styles`; a literal file path has
/// its parent directory as base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut literal = true;
    for comp in path.components() {
        let s = comp.as_os_str().to_string_lossy();
        if s.contains(['*', '?', '[', '{']) {
            literal = false;
            break;
        }
        base.push(comp);
    }
    if literal {
        // Whole pattern is a file path; outputs sit next to nothing deeper.
        base.pop();
    }
    if base.components().all(|c| matches!(c, Component::CurDir)) {
        return PathBuf::new();
    }
    base
}

#[derive(Debug, Default)]
/// Compiled ignore patterns matched against root-relative paths.
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<IgnoreSet> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.trim_start_matches("./")).map_err(|source| BuildError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(IgnoreSet { patterns })
    }

    /// True when `path` (absolute or root-relative) matches any pattern.
    pub fn is_ignored(&self, root: &Path, path: &Path) -> bool {
        let rel = path.strip_prefix(root).unwrap_or(path);
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(rel, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "a { color: red; }\n").unwrap();
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/styles/**/*.scss"), PathBuf::from("src/styles"));
        assert_eq!(glob_base("*.scss"), PathBuf::new());
        assert_eq!(glob_base("src/main.scss"), PathBuf::from("src"));
        assert_eq!(glob_base("./styles/*.scss"), PathBuf::from("./styles"));
    }

    #[test]
    fn test_enumerate_dedupes_and_negates() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "styles/main.scss");
        touch(root, "styles/parts/_grid.scss");
        touch(root, "styles/vendor/lib.scss");

        let files = enumerate(
            root,
            &[
                "styles/**/*.scss".into(),
                "styles/main.scss".into(),
                "!styles/vendor/**".into(),
            ],
        )
        .unwrap();
        let rels: Vec<_> = files.iter().map(|f| f.relative().to_path_buf()).collect();
        assert_eq!(files.len(), 2);
        assert!(rels.contains(&PathBuf::from("main.scss")));
        assert!(rels.contains(&PathBuf::from("parts/_grid.scss")));
        assert!(files.iter().any(|f| f.is_partial()));
    }

    #[test]
    fn test_only_negated_patterns_is_no_sources() {
        let dir = tempdir().unwrap();
        let err = enumerate(dir.path(), &["!x/*.scss".into()]).unwrap_err();
        assert!(matches!(err, BuildError::NoSources));
    }

    #[test]
    fn test_invalid_pattern_reports_pattern() {
        let dir = tempdir().unwrap();
        let err = enumerate(dir.path(), &["styles/[*.scss".into()]).unwrap_err();
        assert!(matches!(err, BuildError::Pattern { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_abort_enumeration() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "styles/main.scss");
        touch(root, "styles/locked/inner.scss");
        let locked = root.join("styles/locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let files = enumerate(root, &["styles/**/*.scss".into()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let files = files.unwrap();
        assert!(files
            .iter()
            .any(|f| f.relative() == Path::new("main.scss")));
    }

    #[test]
    fn test_ignore_set_matches_nested_and_top_level() {
        let root = Path::new("/repo");
        let set = IgnoreSet::new(&["**/_normalize.scss".into()]).unwrap();
        assert!(set.is_ignored(root, Path::new("/repo/src/base/_normalize.scss")));
        assert!(set.is_ignored(root, Path::new("/repo/_normalize.scss")));
        assert!(!set.is_ignored(root, Path::new("/repo/src/_reset.scss")));
    }
}
