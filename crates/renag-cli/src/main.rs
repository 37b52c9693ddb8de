//! renag CLI tool.
//!
//! Usage:
//! ```bash
//! renag check [OPTIONS] [PATH]
//! renag list-rules
//! renag init
//! ```
//!
//! Exit codes: 0 clean or warnings only, 1 critical complaints, 2 load
//! failure, 3 scan failure.

use clap::{Parser, Subcommand};
use renag_core::{CancelToken, ExitStatus, LoadError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod files;
mod interrupt;

use commands::check::CheckOptions;

/// Pattern-based linter that complains about code you did not mean to commit
#[derive(Parser)]
#[command(name = "renag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files and report complaints
    Check {
        /// Directory to scan (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only scan files staged in git
        #[arg(long)]
        staged: bool,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Worker threads (1 = sequential)
        #[arg(short, long, env = "RENAG_JOBS")]
        jobs: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Disable coloured output
        #[arg(long)]
        no_color: bool,
    },

    /// List registered complainers
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for scan results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-complaint compact format.
    Compact,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Check {
            path,
            staged,
            rules,
            exclude,
            jobs,
            format,
            no_color,
        } => {
            let options = CheckOptions {
                path,
                staged,
                rules,
                exclude,
                jobs,
                format,
                no_color,
            };
            let cancel = CancelToken::new();
            if let Err(err) = interrupt::cancel_on_ctrl_c(cancel.clone()) {
                tracing::warn!("Ctrl-C will not stop the scan early: {err}");
            }
            commands::check::run(&options, config, cancel)
        }
        Commands::ListRules => {
            commands::list_rules::run(Path::new("."), config).map(|()| ExitStatus::Clean)
        }
        Commands::Init { force } => match commands::init::run(Path::new("."), force) {
            Ok(()) => Ok(ExitStatus::Clean),
            Err(err) => {
                eprintln!("renag: {err:#}");
                std::process::exit(ExitStatus::LoadFailure.code());
            }
        },
    };

    let status = match outcome {
        Ok(status) => status,
        Err(err) => report_failure(&err),
    };
    std::process::exit(status.code());
}

/// Prints a fatal error to stderr and classifies it.
fn report_failure(err: &anyhow::Error) -> ExitStatus {
    if let Some(load) = err.downcast_ref::<LoadError>() {
        let mut rendered = String::new();
        let handler = miette::GraphicalReportHandler::new();
        if handler.render_report(&mut rendered, load).is_ok() {
            eprintln!("renag: load error:\n{rendered}");
        } else {
            eprintln!("renag: load error: {err:#}");
        }
        ExitStatus::LoadFailure
    } else {
        eprintln!("renag: scan error: {err:#}");
        ExitStatus::ScanFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_all_flags() {
        let cli = Cli::parse_from([
            "renag",
            "check",
            "src",
            "--staged",
            "--rules",
            "debug-print",
            "-e",
            "build/**",
            "-e",
            "dist/**",
            "--jobs",
            "2",
            "--format",
            "json",
            "--no-color",
        ]);
        match cli.command {
            Commands::Check {
                path,
                staged,
                rules,
                exclude,
                jobs,
                format,
                no_color,
            } => {
                assert_eq!(path, PathBuf::from("src"));
                assert!(staged && no_color);
                assert_eq!(rules.as_deref(), Some("debug-print"));
                assert_eq!(exclude, vec!["build/**", "dist/**"]);
                assert_eq!(jobs, Some(2));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn load_errors_exit_with_two_and_others_with_three() {
        let load = anyhow::Error::new(LoadError::EmptyRuleSet);
        assert_eq!(report_failure(&load), ExitStatus::LoadFailure);

        let scan = anyhow::anyhow!("git diff --cached failed");
        assert_eq!(report_failure(&scan), ExitStatus::ScanFailure);
    }
}
