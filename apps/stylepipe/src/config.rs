//! Configuration discovery and effective settings resolution.
//!
//! Stylepipe reads `stylepipe.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `styles.src`: none (must be configured)
//! - `styles.dest`: `dist/css`
//! - `lint.configFile`: `.sass-lint.yml`
//! - `lint.ignore`: `["**/_normalize.scss"]`
//! - `compile.style`: `expanded`, `sourceMap`: false, `errLogToConsole`: true
//! - `compile.strict`: false
//! - `output`: `human`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::models::task::{
    CompileConfiguration, LintConfiguration, OutputStyle, SourceGlob, DEFAULT_IGNORE,
    DEFAULT_RULE_FILE,
};
use crate::pipeline::StyleTask;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DEST: &str = "dist/css";
const CONFIG_FILES: [&str; 3] = ["stylepipe.toml", "stylepipe.yaml", "stylepipe.yml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid TOML: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{} is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[styles]`: which sources participate and where output goes.
pub struct StylesCfg {
    #[serde(default)]
    pub src: Vec<String>,
    pub dest: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[lint]`: rule file location and ignored files.
pub struct LintCfg {
    #[serde(rename = "configFile")]
    pub config_file: Option<String>,
    pub ignore: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[compile]`: compiler options.
pub struct CompileCfg {
    pub style: Option<OutputStyle>,
    #[serde(rename = "sourceMap")]
    pub source_map: Option<bool>,
    #[serde(rename = "errLogToConsole")]
    pub err_log_to_console: Option<bool>,
    /// Exit non-zero when any file fails to compile.
    pub strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `stylepipe.toml|yaml`.
pub struct StylepipeConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub styles: StylesCfg,
    #[serde(default)]
    pub lint: LintCfg,
    #[serde(default)]
    pub compile: CompileCfg,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None`/empty means "not given".
pub struct CliOverrides {
    pub repo_root: Option<String>,
    pub src: Vec<String>,
    pub dest: Option<String>,
    pub lint_config: Option<String>,
    pub ignore: Vec<String>,
    pub style: Option<OutputStyle>,
    pub output: Option<String>,
    pub strict: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub src: Vec<String>,
    pub dest: String,
    pub lint: LintConfiguration,
    pub compile: CompileConfiguration,
    pub output: String,
    pub strict: bool,
}

impl Effective {
    /// Build the styles task described by this configuration.
    pub fn task(&self) -> StyleTask {
        StyleTask {
            root: self.repo_root.clone(),
            sources: SourceGlob {
                patterns: self.src.clone(),
            },
            lint: self.lint.clone(),
            compile: self.compile.clone(),
            dest: PathBuf::from(&self.dest),
        }
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Relative starts are resolved against `cwd` first so the walk can climb
/// past the directory the tool was invoked from. Stops when a
/// `stylepipe.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(cwd: &Path, start: &Path) -> PathBuf {
    let start: PathBuf = cwd
        .join(start)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let mut cur = start.as_path();
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start,
        }
    }
}

/// Load `StylepipeConfig` from `stylepipe.toml` or `stylepipe.yaml|yml`.
///
/// Returns `Ok(None)` when no config file exists.
pub fn load_config(root: &Path) -> Result<Option<StylepipeConfig>, ConfigError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg: StylepipeConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| ConfigError::Toml { path, source })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml { path, source })?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    let repo_root = detect_repo_root(&cwd, &start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let src = if cli.src.is_empty() {
        cfg.styles.src
    } else {
        cli.src.clone()
    };

    let dest = cli
        .dest
        .clone()
        .or(cfg.styles.dest)
        .unwrap_or_else(|| DEFAULT_DEST.to_string());

    let rule_file = cli
        .lint_config
        .clone()
        .or(cfg.lint.config_file)
        .unwrap_or_else(|| DEFAULT_RULE_FILE.to_string());
    let ignore = if cli.ignore.is_empty() {
        cfg.lint
            .ignore
            .unwrap_or_else(|| vec![DEFAULT_IGNORE.to_string()])
    } else {
        cli.ignore.clone()
    };

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(ConfigError::Invalid(format!(
            "unknown output mode '{}' (expected human|json)",
            output
        )));
    }

    let defaults = CompileConfiguration::default();
    let compile = CompileConfiguration {
        style: cli.style.or(cfg.compile.style).unwrap_or(defaults.style),
        source_map: cfg.compile.source_map.unwrap_or(defaults.source_map),
        log_errors: cfg
            .compile
            .err_log_to_console
            .unwrap_or(defaults.log_errors),
    };
    let strict = cli.strict || cfg.compile.strict.unwrap_or(false);

    Ok(Effective {
        repo_root,
        config_found,
        src,
        dest,
        lint: LintConfiguration {
            ignore,
            rule_file: PathBuf::from(rule_file),
        },
        compile,
        output,
        strict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> CliOverrides {
        CliOverrides {
            repo_root: root.to_str().map(str::to_string),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("stylepipe.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
[styles]
src = ["src/styles/**/*.scss"]
dest = "public/css"
[lint]
configFile = "lint/sass-lint.yml"
[compile]
style = "compressed"
strict = true
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(&at(root)).unwrap();
        assert!(eff.config_found);
        assert_eq!(eff.src, vec!["src/styles/**/*.scss".to_string()]);
        assert_eq!(eff.dest, "public/css");
        assert_eq!(eff.output, "json");
        assert_eq!(eff.lint.rule_file, PathBuf::from("lint/sass-lint.yml"));
        assert_eq!(eff.lint.ignore, vec![DEFAULT_IGNORE.to_string()]);
        assert_eq!(eff.compile.style, OutputStyle::Compressed);
        assert!(eff.strict);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("stylepipe.yaml"),
            "styles:\n  src:\n    - styles/*.scss\n",
        )
        .unwrap();

        let eff = resolve_effective(&at(root)).unwrap();
        assert_eq!(eff.src, vec!["styles/*.scss".to_string()]);
        assert_eq!(eff.dest, DEFAULT_DEST);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.lint, LintConfiguration::default());
        assert_eq!(eff.compile, CompileConfiguration::default());
        assert!(!eff.strict);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("stylepipe.toml"),
            "[styles]\nsrc = [\"a/*.scss\"]\ndest = \"out\"\n[lint]\nignore = [\"vendor/**\"]\n",
        )
        .unwrap();

        let cli = CliOverrides {
            src: vec!["b/*.scss".into()],
            dest: Some("build".into()),
            ignore: vec!["x/**".into()],
            style: Some(OutputStyle::Compressed),
            ..at(root)
        };
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.src, vec!["b/*.scss".to_string()]);
        assert_eq!(eff.dest, "build");
        assert_eq!(eff.lint.ignore, vec!["x/**".to_string()]);
        assert_eq!(eff.compile.style, OutputStyle::Compressed);
        assert_eq!(eff.task().dest, PathBuf::from("build"));
    }

    #[test]
    fn test_no_config_file() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&at(dir.path())).unwrap();
        assert!(!eff.config_found);
        assert!(eff.src.is_empty());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("stylepipe.toml"), "[styles\n").unwrap();
        assert!(matches!(
            resolve_effective(&at(root)),
            Err(ConfigError::Toml { .. })
        ));
        fs::write(root.join("stylepipe.toml"), "output = \"xml\"\n").unwrap();
        assert!(matches!(
            resolve_effective(&at(root)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_detect_walks_up_from_relative_start() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("stylepipe.toml"), "[styles]\nsrc = [\"styles/*.scss\"]\n").unwrap();
        let nested = root.join("styles/nested");
        fs::create_dir_all(&nested).unwrap();

        let detected = detect_repo_root(&nested, Path::new("."));
        assert_eq!(detected, root);
        assert!(load_config(&detected).unwrap().is_some());
        let from_parent = detect_repo_root(&nested, Path::new(".."));
        assert_eq!(from_parent, root);
    }

    #[test]
    fn test_compile_keys_from_config_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("stylepipe.toml"),
            "[styles]\nsrc = [\"a/*.scss\"]\n[compile]\nsourceMap = true\nerrLogToConsole = false\n",
        )
        .unwrap();

        let eff = resolve_effective(&at(root)).unwrap();
        assert!(eff.compile.source_map);
        assert!(!eff.compile.log_errors);
        assert_eq!(eff.compile.style, OutputStyle::Expanded);
        assert!(!eff.task().compile.log_errors);
    }
}
