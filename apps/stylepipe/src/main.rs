//! Stylepipe CLI binary entry point.
//! Resolves configuration, runs lint/build, prints results, and maps
//! outcomes to exit codes (1 = lint/strict compile failure, 2 = usage).

use clap::Parser;
use stylepipe::cli::{Cli, Commands};
use stylepipe::config::{self, CliOverrides, Effective};
use stylepipe::error::BuildError;
use stylepipe::models::LintResult;
use stylepipe::output;
use stylepipe::utils::{error_prefix, note_prefix};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint { common } => {
            let eff = resolve_or_exit(&common.overrides());
            match eff.task().lint() {
                Ok(result) => {
                    output::print_lint(&result, &eff.output);
                    if result.has_errors() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(2);
                }
            }
        }
        Commands::Build {
            common,
            dest,
            style,
            strict,
        } => {
            let overrides = CliOverrides {
                dest,
                style,
                strict,
                ..common.overrides()
            };
            let eff = resolve_or_exit(&overrides);
            let json = eff.output == "json";
            // JSON mode emits a single document, so lint output is deferred
            let mut deferred: Option<LintResult> = None;
            let result = eff.task().run(|lint| {
                if json {
                    deferred = Some(lint.clone());
                } else {
                    output::print_lint(lint, &eff.output);
                }
            });
            match result {
                Ok(report) => {
                    output::print_build(
                        &eff.repo_root,
                        &report,
                        &eff.output,
                        eff.compile.log_errors,
                    );
                    if eff.strict && !report.is_clean() {
                        std::process::exit(1);
                    }
                }
                Err(e @ BuildError::LintFailed { .. }) => {
                    if let Some(lint) = deferred.as_ref() {
                        output::print_lint(lint, &eff.output);
                    }
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(2);
                }
            }
        }
    }
}

/// Resolve configuration, exiting with status 2 when it is unusable.
fn resolve_or_exit(overrides: &CliOverrides) -> Effective {
    let eff = match config::resolve_effective(overrides) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No stylepipe.toml found; using defaults.", note_prefix());
    }
    if eff.src.is_empty() {
        eprintln!(
            "{} Sources are not configured. Pass --src or add [styles].src to stylepipe.toml.",
            error_prefix()
        );
        std::process::exit(2);
    }
    eff
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "stylepipe=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
