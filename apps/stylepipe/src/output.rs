//! Output rendering for lint and build commands.
//!
//! Supports `human` (default) and `json` outputs. Human lint output is
//! grouped per file in the "stylish" layout; the JSON form includes the
//! issues and a top-level summary.

use crate::models::{LintResult, Severity};
use crate::pipeline::BuildReport;
use crate::utils::{display_path, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

/// Print lint results in the requested format.
pub fn print_lint(res: &LintResult, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_lint_json(res)).unwrap_or_default()
        ),
        _ => print!("{}", render_lint_human(res, use_colors(output))),
    }
}

/// Render lint issues grouped by file, followed by a problem count.
pub fn render_lint_human(res: &LintResult, color: bool) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for is in &res.issues {
        if current != Some(is.file.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            if color {
                out.push_str(&is.file.underline().to_string());
            } else {
                out.push_str(&is.file);
            }
            out.push('\n');
            current = Some(is.file.as_str());
        }
        let sev = match (is.severity, color) {
            (Severity::Error, true) => "error".red().to_string(),
            (Severity::Error, false) => "error".to_string(),
            (Severity::Warning, true) => "warning".yellow().to_string(),
            (Severity::Warning, false) => "warning".to_string(),
        };
        let rule = if color {
            is.rule.bright_black().to_string()
        } else {
            is.rule.clone()
        };
        // pad before colouring would be lost in escapes; pad the plain text
        let pad = " ".repeat("warning".len() - severity_label(is.severity).len());
        out.push_str(&format!(
            "  {}:{}  {}{}  {}  {}\n",
            is.line, is.column, sev, pad, is.message, rule
        ));
    }

    let total = res.summary.errors + res.summary.warnings;
    if total > 0 {
        let line = format!(
            "\n✖ {} problem{} ({} error{}, {} warning{}) in {} file{}\n",
            total,
            plural(total),
            res.summary.errors,
            plural(res.summary.errors),
            res.summary.warnings,
            plural(res.summary.warnings),
            res.summary.files,
            plural(res.summary.files),
        );
        if color && res.summary.errors > 0 {
            out.push_str(&line.red().bold().to_string());
        } else if color {
            out.push_str(&line.yellow().bold().to_string());
        } else {
            out.push_str(&line);
        }
    } else {
        let line = format!("✔ {} file{} linted, no problems\n", res.summary.files, plural(res.summary.files));
        if color {
            out.push_str(&line.green().to_string());
        } else {
            out.push_str(&line);
        }
    }
    out
}

fn severity_label(sev: Severity) -> &'static str {
    match sev {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Print the compile stage of a build: written files and failures.
///
/// When `failures_logged` is set the failures already went to the log as
/// they happened, so only the summary counts them.
pub fn print_build(root: &Path, report: &BuildReport, output: &str, failures_logged: bool) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_build_json(root, report)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for c in &report.compiled {
                let src = display_path(root, &c.source);
                let out = display_path(root, &c.output);
                if color {
                    println!("{} {} -> {}", "compiled:".green().bold(), src, out.bold());
                } else {
                    println!("compiled: {} -> {}", src, out);
                }
            }
            eprint!("{}", render_failures(report, color, failures_logged));
            let summary = format!(
                "— Summary — compiled={} failed={}",
                report.compiled.len(),
                report.failures.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Render `failed:` lines for the build report, unless already logged.
pub fn render_failures(report: &BuildReport, color: bool, failures_logged: bool) -> String {
    if failures_logged {
        return String::new();
    }
    let mut out = String::new();
    for f in &report.failures {
        if color {
            out.push_str(&format!("{} {}\n", "failed:".red().bold(), f));
        } else {
            out.push_str(&format!("failed: {}\n", f));
        }
    }
    out
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult) -> JsonVal {
    // Directly serialize LintResult as JSON, keeping stable shape
    serde_json::to_value(res).unwrap_or(JsonVal::Null)
}

/// Compose build JSON object (pure) for testing/snapshot purposes.
pub fn compose_build_json(root: &Path, report: &BuildReport) -> JsonVal {
    let compiled: Vec<_> = report
        .compiled
        .iter()
        .map(|c| {
            json!({
                "source": display_path(root, &c.source),
                "output": display_path(root, &c.output),
            })
        })
        .collect();
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| {
            json!({
                "file": f.file().map(|p| display_path(root, p)),
                "message": f.to_string(),
            })
        })
        .collect();
    json!({
        "lint": compose_lint_json(&report.lint),
        "compiled": compiled,
        "failures": failures,
        "summary": {
            "compiled": report.compiled.len(),
            "failed": report.failures.len(),
        },
    })
}
