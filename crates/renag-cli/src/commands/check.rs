//! Check command implementation.

use anyhow::Result;
use renag_core::{CancelToken, ComplainerSource, ExitStatus, FsSource, RuleSet, Scanner};
use renag_rules::BuiltinRules;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::files;
use crate::OutputFormat;

/// Options for `renag check`.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Directory to scan.
    pub path: PathBuf,
    /// Only scan files staged in git.
    pub staged: bool,
    /// Comma-separated rule names to keep.
    pub rules: Option<String>,
    /// Extra global exclude globs.
    pub exclude: Vec<String>,
    /// Worker threads.
    pub jobs: Option<usize>,
    /// Output format.
    pub format: OutputFormat,
    /// Disable colours in text output.
    pub no_color: bool,
}

/// Runs the check command and returns the exit status for the scan.
///
/// Cancelling `cancel` stops the scan early; the partial report is still
/// printed.
///
/// # Errors
///
/// Returns a [`renag_core::LoadError`] for configuration and rule problems,
/// and other errors for listing or scan failures.
pub fn run(
    options: &CheckOptions,
    config_path: Option<&Path>,
    cancel: CancelToken,
) -> Result<ExitStatus> {
    let source = config_resolver::resolve(&options.path, config_path);
    let loaded = source.load()?;
    let config = loaded.config;

    let mut sources: Vec<&dyn ComplainerSource> = vec![&BuiltinRules];
    if let Some(toml) = &loaded.rules {
        sources.push(toml);
    }

    let mut rules = RuleSet::load(&sources, &config)?;
    if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        rules = rules.only(&names)?;
    }

    let mut builder = Scanner::builder()
        .rules(rules)
        .cancel_token(cancel)
        .excludes(options.exclude.iter().cloned());
    if let Some(jobs) = options.jobs {
        builder = builder.parallelism(jobs);
    }
    let scanner = builder.config(&config).build()?;

    let root = if config.scan.root == Path::new(".") {
        options.path.clone()
    } else {
        options.path.join(&config.scan.root)
    };
    let candidates = if options.staged {
        files::staged(&root)?
    } else {
        files::walk(&root, config.scan.respect_gitignore)?
    };
    tracing::info!(
        "Scanning {} candidate files under {} with {} rules",
        candidates.len(),
        root.display(),
        scanner.rules().len()
    );

    let result = scanner.scan(&FsSource::new(root, candidates))?;

    let style = super::output::style(options.no_color, config.scan.color);
    let text = super::output::format(&result, options.format, style)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;

    Ok(ExitStatus::for_result(&result))
}
