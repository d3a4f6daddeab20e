//! CLI argument parsing via `clap`.

use crate::config::CliOverrides;
use crate::models::task::OutputStyle;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stylepipe",
    version,
    about = "Lint and compile SCSS stylesheets",
    long_about = "Stylepipe — lint SCSS sources against a sass-lint rule file, then compile them to CSS.\n\nConfiguration precedence: CLI > stylepipe.toml > defaults.",
    after_help = "Examples:\n  stylepipe build --src 'src/styles/**/*.scss' --dest dist/css\n  stylepipe lint --output json\n  stylepipe styles --style compressed --strict",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Log debug details to stderr")]
    pub verbose: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Only log errors")]
    pub quiet: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current stylepipe version.")]
    Version,
    /// Lint, then compile
    #[command(
        visible_alias = "styles",
        about = "Lint and compile stylesheets",
        long_about = "Lint the configured sources; when no error-severity issue is found, compile every non-partial file into the destination directory.",
        after_help = "Examples:\n  stylepipe build\n  stylepipe build --src 'styles/**/*.scss' --dest public/css --style compressed"
    )]
    Build {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Output directory (default: dist/css)")]
        dest: Option<String>,
        #[arg(long, value_parser = parse_style, help = "Output style: expanded|compressed (default: expanded)")]
        style: Option<OutputStyle>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero when any file fails to compile")]
        strict: bool,
    },
    /// Lint only
    #[command(
        about = "Run lint checks",
        long_about = "Lint the configured sources with the rule file. Error-severity issues exit non-zero.",
        after_help = "Examples:\n  stylepipe lint\n  stylepipe lint --lint-config .sass-lint.yml --output json"
    )]
    Lint {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
/// Options shared by `build` and `lint`.
pub struct CommonArgs {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Source glob; repeat for several (default: [styles].src)")]
    pub src: Vec<String>,
    #[arg(long, help = "Rule file (default: .sass-lint.yml)")]
    pub lint_config: Option<String>,
    #[arg(long, help = "Glob excluded from linting; repeat for several (default: **/_normalize.scss)")]
    pub ignore: Vec<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}

impl CommonArgs {
    pub fn overrides(self) -> CliOverrides {
        CliOverrides {
            repo_root: self.repo_root,
            src: self.src,
            lint_config: self.lint_config,
            ignore: self.ignore,
            output: self.output,
            ..CliOverrides::default()
        }
    }
}

fn parse_style(s: &str) -> Result<OutputStyle, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_alias_and_repeated_src() {
        let cli = Cli::try_parse_from([
            "stylepipe",
            "styles",
            "--src",
            "a/*.scss",
            "--src",
            "b/*.scss",
            "--style",
            "compressed",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Build { common, style, .. } => {
                assert_eq!(common.src, vec!["a/*.scss", "b/*.scss"]);
                assert_eq!(style, Some(OutputStyle::Compressed));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_bad_style_is_rejected() {
        assert!(Cli::try_parse_from(["stylepipe", "build", "--style", "loud"]).is_err());
    }
}
