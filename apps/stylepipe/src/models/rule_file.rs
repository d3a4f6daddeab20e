//! Rule file schema (`.sass-lint.yml`).
//!
//! Key components:
//! - `options.merge-default-rules`: overlay `rules` on the built-in defaults
//!   (default true) or use `rules` alone.
//! - `files.ignore`: extra patterns excluded from linting.
//! - `rules`: map of rule name to severity (`0|1|2`) or `[severity, {opts}]`.

use serde::Deserialize;
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::BTreeMap;

#[derive(Deserialize, Debug, Default)]
/// Root of a sass-lint style rule file.
pub struct RuleFile {
    #[serde(default)]
    pub options: RuleFileOptions,
    #[serde(default)]
    pub files: RuleFileFiles,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
}

#[derive(Deserialize, Debug)]
pub struct RuleFileOptions {
    #[serde(rename = "merge-default-rules", default = "default_true")]
    pub merge_default_rules: bool,
}

impl Default for RuleFileOptions {
    fn default() -> Self {
        RuleFileOptions {
            merge_default_rules: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug, Default)]
pub struct RuleFileFiles {
    #[serde(default)]
    pub include: Option<OneOrMany>,
    #[serde(default)]
    pub ignore: Option<OneOrMany>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
/// sass-lint accepts either a single pattern or a list.
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
/// Severity alone, or `[severity, options]`.
pub enum RuleSetting {
    Level(u8),
    List(Vec<Yaml>),
}

impl RuleSetting {
    /// Severity number; malformed lists count as disabled.
    pub fn level(&self) -> u8 {
        match self {
            RuleSetting::Level(l) => *l,
            RuleSetting::List(items) => items
                .first()
                .and_then(Yaml::as_u64)
                .map(|l| l.min(2) as u8)
                .unwrap_or(0),
        }
    }

    /// Options map when given as the second list element.
    pub fn options(&self) -> RuleOptions {
        match self {
            RuleSetting::Level(_) => RuleOptions::default(),
            RuleSetting::List(items) => RuleOptions(
                items
                    .get(1)
                    .and_then(Yaml::as_mapping)
                    .cloned()
                    .unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Typed accessors over a rule's option map.
pub struct RuleOptions(pub Mapping);

impl RuleOptions {
    pub fn usize(&self, key: &str) -> Option<usize> {
        self.0
            .get(key)
            .and_then(Yaml::as_u64)
            .map(|v| v as usize)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Yaml::as_bool)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Yaml::as_str)
    }
}
