//! Built-in lint rules.
//!
//! Every rule sees a pre-scanned [`Source`]: per-line code with comments
//! blanked out (columns preserved), plus the positions of block comments and
//! string literals. Rules report [`Finding`]s; severity is attached by the
//! caller from the rule file.

use crate::models::rule_file::{RuleFile, RuleOptions};
use crate::models::Severity;
use regex::Regex;
use std::sync::LazyLock;

/// Rules enabled when the rule file merges defaults, with their severities.
pub const DEFAULT_RULES: &[(&str, u8)] = &[
    ("no-ids", 1),
    ("no-important", 1),
    ("no-debug", 1),
    ("no-warn", 1),
    ("no-css-comments", 1),
    ("no-trailing-whitespace", 1),
    ("final-newline", 1),
    ("indentation", 1),
    ("max-line-length", 0),
    ("zero-unit", 1),
    ("hex-length", 1),
    ("no-empty-rulesets", 1),
    ("quotes", 1),
];

static ID_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#-?[_a-zA-Z][\w-]*").unwrap());
static IMPORTANT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\s*important\b").unwrap());
static DEBUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@debug\b").unwrap());
static WARN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@warn\b").unwrap());
static ZERO_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s:(,])(0(?:\.0+)?(?:px|em|rem|ex|ch|vw|vh|vmin|vmax|cm|mm|in|pt|pc))\b")
        .unwrap()
});
static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})\b").unwrap());
static EMPTY_RULESET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\s*\}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rule violation before severity is attached. Positions are 1-based.
pub struct Finding {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Finding {
    fn at(line: usize, column: usize, message: impl Into<String>) -> Finding {
        Finding {
            line,
            column,
            message: message.into(),
        }
    }
}

/// One source line; `code` has the same char count as `raw`.
pub struct Line<'a> {
    pub number: usize,
    pub raw: &'a str,
    pub code: String,
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.code.trim().is_empty()
    }

    /// Value part of a declaration (`prop: value;`), with its char offset.
    fn declaration_value(&self) -> Option<(usize, &str)> {
        let trimmed = self.code.trim_end();
        if trimmed.ends_with('{') || trimmed.trim_start().starts_with('@') {
            return None;
        }
        let idx = self.code.find(':')?;
        let offset = self.code[..=idx].chars().count();
        Some((offset, &self.code[idx + 1..]))
    }

    /// Selector text for lines that open a block or continue a selector list.
    fn selector(&self) -> Option<&str> {
        let trimmed = self.code.trim();
        if trimmed.starts_with('@') || trimmed.starts_with('$') {
            return None;
        }
        if let Some(idx) = block_open(&self.code) {
            let sel = &self.code[..idx];
            if sel.contains(';') {
                return None;
            }
            return Some(sel);
        }
        if trimmed.ends_with(',') && !trimmed.contains(['(', ';']) {
            return Some(&self.code);
        }
        None
    }
}

/// Byte index of the first `{` that is not an interpolation (`#{`).
fn block_open(code: &str) -> Option<usize> {
    let mut prev = None;
    for (idx, c) in code.char_indices() {
        if c == '{' && prev != Some('#') {
            return Some(idx);
        }
        prev = Some(c);
    }
    None
}

pub struct BlockComment {
    pub line: usize,
    pub column: usize,
    /// `/*!` comments are kept by compressed output and allowed.
    pub loud: bool,
}

pub struct StringLit {
    pub line: usize,
    pub column: usize,
    pub quote: char,
    pub content: String,
}

/// Pre-scanned stylesheet shared by all rules.
pub struct Source<'a> {
    pub text: &'a str,
    pub lines: Vec<Line<'a>>,
    pub block_comments: Vec<BlockComment>,
    pub strings: Vec<StringLit>,
}

impl<'a> Source<'a> {
    pub fn scan(text: &'a str) -> Source<'a> {
        let mut lines = Vec::new();
        let mut block_comments = Vec::new();
        let mut strings: Vec<StringLit> = Vec::new();
        let mut in_block = false;

        for (idx, raw) in text.split('\n').enumerate() {
            let number = idx + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let chars: Vec<char> = raw.chars().collect();
            let mut code = String::with_capacity(raw.len());
            // Unterminated strings end with the line.
            let mut in_string: Option<char> = None;
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                let next = chars.get(i + 1).copied();
                if in_block {
                    if c == '*' && next == Some('/') {
                        code.push_str("  ");
                        in_block = false;
                        i += 2;
                    } else {
                        code.push(' ');
                        i += 1;
                    }
                    continue;
                }
                if let Some(q) = in_string {
                    code.push(c);
                    if c == q {
                        in_string = None;
                    } else if let Some(lit) = strings.last_mut() {
                        lit.content.push(c);
                        if c == '\\' {
                            if let Some(n) = next {
                                code.push(n);
                                lit.content.push(n);
                                i += 1;
                            }
                        }
                    }
                    i += 1;
                    continue;
                }
                match c {
                    '"' | '\'' => {
                        in_string = Some(c);
                        strings.push(StringLit {
                            line: number,
                            column: i + 1,
                            quote: c,
                            content: String::new(),
                        });
                        code.push(c);
                    }
                    '/' if next == Some('*') => {
                        block_comments.push(BlockComment {
                            line: number,
                            column: i + 1,
                            loud: chars.get(i + 2) == Some(&'!'),
                        });
                        in_block = true;
                        code.push_str("  ");
                        i += 2;
                        continue;
                    }
                    // `url(http://...)` keeps its double slash.
                    '/' if next == Some('/') && !(i > 0 && chars[i - 1] == ':') => {
                        code.extend(std::iter::repeat_n(' ', chars.len() - i));
                        break;
                    }
                    _ => code.push(c),
                }
                i += 1;
            }
            lines.push(Line { number, raw, code });
        }

        Source {
            text,
            lines,
            block_comments,
            strings,
        }
    }

    /// Map a byte offset into `code_text()` back to a (line, column) pair.
    fn position_in_code(&self, offset: usize) -> (usize, usize) {
        let mut remaining = offset;
        for line in &self.lines {
            let len = line.code.len();
            if remaining <= len {
                return (line.number, line.code[..remaining].chars().count() + 1);
            }
            remaining -= len + 1;
        }
        (self.lines.len(), 1)
    }

    fn code_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.code.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A lint rule over a scanned stylesheet.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, src: &Source) -> Vec<Finding>;
}

/// A rule paired with the severity the rule file assigned to it.
pub struct ConfiguredRule {
    pub rule: Box<dyn Rule>,
    pub severity: Severity,
}

/// Instantiate a built-in rule by name.
pub fn build_rule(name: &str, opts: &RuleOptions) -> Option<Box<dyn Rule>> {
    let rule: Box<dyn Rule> = match name {
        "no-ids" => Box::new(NoIds),
        "no-important" => Box::new(PatternRule {
            name: "no-important",
            re: &IMPORTANT,
            message: "!important not allowed",
        }),
        "no-debug" => Box::new(PatternRule {
            name: "no-debug",
            re: &DEBUG,
            message: "@debug not allowed",
        }),
        "no-warn" => Box::new(PatternRule {
            name: "no-warn",
            re: &WARN,
            message: "@warn not allowed",
        }),
        "no-css-comments" => Box::new(NoCssComments),
        "no-trailing-whitespace" => Box::new(NoTrailingWhitespace),
        "final-newline" => Box::new(FinalNewline {
            include: opts.bool("include").unwrap_or(true),
        }),
        "indentation" => Box::new(Indentation {
            size: opts.usize("size").filter(|s| *s > 0).unwrap_or(2),
        }),
        "max-line-length" => Box::new(MaxLineLength {
            length: opts.usize("length").unwrap_or(80),
        }),
        "zero-unit" => Box::new(ZeroUnit),
        "hex-length" => Box::new(HexLength {
            short: opts.str("style").map_or(true, |s| s != "long"),
        }),
        "no-empty-rulesets" => Box::new(NoEmptyRulesets),
        "quotes" => Box::new(Quotes {
            quote: if opts.str("style") == Some("double") {
                '"'
            } else {
                '\''
            },
        }),
        _ => return None,
    };
    Some(rule)
}

/// Resolve the enabled rules for a rule file, merging defaults when asked.
pub fn resolve(rule_file: &RuleFile) -> Vec<ConfiguredRule> {
    let mut settings: Vec<(String, u8, RuleOptions)> = Vec::new();
    if rule_file.options.merge_default_rules {
        for (name, level) in DEFAULT_RULES {
            settings.push((name.to_string(), *level, RuleOptions::default()));
        }
    }
    for (name, setting) in &rule_file.rules {
        let entry = (name.clone(), setting.level(), setting.options());
        match settings.iter_mut().find(|(n, _, _)| n == name) {
            Some(slot) => *slot = entry,
            None => settings.push(entry),
        }
    }

    let mut out = Vec::new();
    for (name, level, opts) in settings {
        let Some(severity) = Severity::from_level(level) else {
            continue;
        };
        match build_rule(&name, &opts) {
            Some(rule) => out.push(ConfiguredRule { rule, severity }),
            None => tracing::warn!("unknown lint rule '{}' ignored", name),
        }
    }
    out
}

struct NoIds;

impl Rule for NoIds {
    fn name(&self) -> &'static str {
        "no-ids"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let mut out = Vec::new();
        for line in &src.lines {
            if let Some(sel) = line.selector() {
                for m in ID_SELECTOR.find_iter(sel) {
                    let col = sel[..m.start()].chars().count() + 1;
                    out.push(Finding::at(line.number, col, "ID selectors not allowed"));
                }
            }
        }
        out
    }
}

/// Flags every match of a regex in comment-free code.
struct PatternRule {
    name: &'static str,
    re: &'static LazyLock<Regex>,
    message: &'static str,
}

impl Rule for PatternRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        src.lines
            .iter()
            .flat_map(|line| {
                self.re.find_iter(&line.code).map(move |m| {
                    let col = line.code[..m.start()].chars().count() + 1;
                    Finding::at(line.number, col, self.message)
                })
            })
            .collect()
    }
}

struct NoCssComments;

impl Rule for NoCssComments {
    fn name(&self) -> &'static str {
        "no-css-comments"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        src.block_comments
            .iter()
            .filter(|c| !c.loud)
            .map(|c| {
                Finding::at(
                    c.line,
                    c.column,
                    "Multiline style comments should not be used",
                )
            })
            .collect()
    }
}

struct NoTrailingWhitespace;

impl Rule for NoTrailingWhitespace {
    fn name(&self) -> &'static str {
        "no-trailing-whitespace"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        src.lines
            .iter()
            .filter(|l| l.raw.ends_with([' ', '\t']))
            .map(|l| {
                let col = l.raw.trim_end().chars().count() + 1;
                Finding::at(l.number, col, "Whitespace detected at end of line")
            })
            .collect()
    }
}

struct FinalNewline {
    include: bool,
}

impl Rule for FinalNewline {
    fn name(&self) -> &'static str {
        "final-newline"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        if src.text.is_empty() {
            return Vec::new();
        }
        let ends = src.text.ends_with('\n');
        let last = src.text.lines().count().max(1);
        match (self.include, ends) {
            (true, false) => vec![Finding::at(last, 1, "Files must end with a new line")],
            (false, true) => vec![Finding::at(last, 1, "Files must not end with a new line")],
            _ => Vec::new(),
        }
    }
}

struct Indentation {
    size: usize,
}

impl Rule for Indentation {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let mut out = Vec::new();
        let mut depth: usize = 0;
        let mut statement_start = true;
        for line in &src.lines {
            if line.is_blank() {
                continue;
            }
            let code = line.code.trim();
            let leading: String = line.raw.chars().take_while(|c| c.is_whitespace()).collect();
            if leading.contains('\t') {
                out.push(Finding::at(line.number, 1, "Tabs are not allowed for indentation"));
            } else if statement_start {
                let level = if code.starts_with('}') {
                    depth.saturating_sub(1)
                } else {
                    depth
                };
                let expected = level * self.size;
                if leading.len() != expected {
                    out.push(Finding::at(
                        line.number,
                        1,
                        format!(
                            "Indentation of {}, expected {}",
                            leading.len(),
                            expected
                        ),
                    ));
                }
            }
            let opens = code.matches('{').count();
            let closes = code.matches('}').count();
            depth = (depth + opens).saturating_sub(closes);
            statement_start = code.ends_with(['{', '}', ';']);
        }
        out
    }
}

struct MaxLineLength {
    length: usize,
}

impl Rule for MaxLineLength {
    fn name(&self) -> &'static str {
        "max-line-length"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        src.lines
            .iter()
            .filter(|l| l.raw.chars().count() > self.length)
            .map(|l| {
                Finding::at(
                    l.number,
                    self.length + 1,
                    format!(
                        "line {} exceeds the maximum line length of {}",
                        l.number, self.length
                    ),
                )
            })
            .collect()
    }
}

struct ZeroUnit;

impl Rule for ZeroUnit {
    fn name(&self) -> &'static str {
        "zero-unit"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let mut out = Vec::new();
        for line in &src.lines {
            let Some((offset, value)) = line.declaration_value() else {
                continue;
            };
            for caps in ZERO_UNIT.captures_iter(value) {
                if let Some(m) = caps.get(1) {
                    let col = offset + value[..m.start()].chars().count() + 1;
                    out.push(Finding::at(
                        line.number,
                        col,
                        "No unit allowed for values of 0",
                    ));
                }
            }
        }
        out
    }
}

struct HexLength {
    short: bool,
}

impl Rule for HexLength {
    fn name(&self) -> &'static str {
        "hex-length"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let mut out = Vec::new();
        for line in &src.lines {
            let Some((offset, value)) = line.declaration_value() else {
                continue;
            };
            for caps in HEX.captures_iter(value) {
                let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let digits = digits.as_str();
                let col = offset + value[..whole.start()].chars().count() + 1;
                if self.short && digits.len() == 6 && is_shortenable(digits) {
                    out.push(Finding::at(
                        line.number,
                        col,
                        format!("Color '#{}' should be written in its short form", digits),
                    ));
                } else if !self.short && digits.len() == 3 {
                    out.push(Finding::at(
                        line.number,
                        col,
                        format!("Color '#{}' should be written in its long form", digits),
                    ));
                }
            }
        }
        out
    }
}

fn is_shortenable(digits: &str) -> bool {
    let b = digits.as_bytes();
    b[0].eq_ignore_ascii_case(&b[1])
        && b[2].eq_ignore_ascii_case(&b[3])
        && b[4].eq_ignore_ascii_case(&b[5])
}

struct NoEmptyRulesets;

impl Rule for NoEmptyRulesets {
    fn name(&self) -> &'static str {
        "no-empty-rulesets"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let code = src.code_text();
        EMPTY_RULESET
            .find_iter(&code)
            // `#{}` is an (empty) interpolation, not a block.
            .filter(|m| !code[..m.start()].ends_with('#'))
            .map(|m| {
                let (line, col) = src.position_in_code(m.start());
                Finding::at(line, col, "Empty rulesets are not allowed")
            })
            .collect()
    }
}

struct Quotes {
    quote: char,
}

impl Rule for Quotes {
    fn name(&self) -> &'static str {
        "quotes"
    }

    fn check(&self, src: &Source) -> Vec<Finding> {
        let kind = if self.quote == '"' { "double" } else { "single" };
        src.strings
            .iter()
            .filter(|s| s.quote != self.quote && !s.content.contains(self.quote))
            .map(|s| Finding::at(s.line, s.column, format!("Strings must use {} quotes", kind)))
            .collect()
    }
}
