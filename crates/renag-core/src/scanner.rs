//! Scan orchestration: selection, matching, building and aggregation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::builder::{build, HookError};
use crate::config::Config;
use crate::pattern::MAX_NESTING;
use crate::registry::{Complainer, LoadError, RuleSet};
use crate::select::{self, GlobPattern};
use crate::source::SourceProvider;
use crate::types::{Complaint, ScanResult};

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A validation hook failed.
    #[error("hook of complainer `{rule}` failed on {}: {source}", path.display())]
    Hook {
        /// The rule whose hook failed.
        rule: String,
        /// The file being checked.
        path: PathBuf,
        /// The hook's error.
        source: HookError,
    },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Cooperative cancellation flag shared with a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builder for configuring a [`Scanner`].
#[derive(Default)]
pub struct ScannerBuilder {
    rules: RuleSet,
    exclude_patterns: Vec<String>,
    parallelism: Option<usize>,
    cancel: Option<CancelToken>,
}

impl ScannerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rules to run.
    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Adds a global exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple global exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the number of worker threads. `1` scans sequentially.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Takes excludes and parallelism from `[scan]`.
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.exclude_patterns.extend(config.scan.exclude.iter().cloned());
        if self.parallelism.is_none() {
            self.parallelism = config.scan.parallelism;
        }
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds the scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid.
    pub fn build(self) -> Result<Scanner, LoadError> {
        let exclude = select::compile_globs(&self.exclude_patterns)
            .map_err(|source| LoadError::InvalidExclude { source })?;
        Ok(Scanner {
            rules: self.rules,
            exclude,
            parallelism: self.parallelism.filter(|&n| n > 0),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Runs a rule set over the files of a [`SourceProvider`].
///
/// Use [`Scanner::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Scanner {
    rules: RuleSet,
    exclude: Vec<GlobPattern>,
    parallelism: Option<usize>,
    cancel: CancelToken,
}

/// Per-file outcome of the matching stage.
enum FileOutcome {
    Scanned(Vec<Complaint>),
    Skipped,
}

impl Scanner {
    /// Creates a new builder for configuring a scanner.
    #[must_use]
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    /// The loaded rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// A handle to this scanner's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Scans every candidate of `source` and returns the sorted result.
    ///
    /// Files are read once and matched against every rule that selects them.
    /// Unreadable or non-UTF-8 files are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if a validation hook fails or the worker pool cannot
    /// be started.
    pub fn scan(&self, source: &dyn SourceProvider) -> Result<ScanResult, ScanError> {
        let candidates: Vec<PathBuf> = source
            .candidates()
            .into_iter()
            .filter(|p| !self.exclude.iter().any(|g| g.matches(p)))
            .collect();
        info!("Found {} candidate files", candidates.len());

        let work = self.plan(&candidates);
        info!(
            "Scanning {} files with {} complainers",
            work.len(),
            self.rules.len()
        );

        let run = |(path, rules): &(PathBuf, Vec<&Complainer>)| self.scan_file(source, path, rules);
        let outcomes: Vec<FileOutcome> = match self.parallelism {
            Some(1) => work.iter().map(run).collect::<Result<Vec<_>, _>>()?,
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| work.par_iter().map(run).collect::<Result<Vec<_>, _>>())?
            }
            None => work.par_iter().map(run).collect::<Result<Vec<_>, _>>()?,
        };

        let mut files_scanned = 0;
        let mut complaints = Vec::new();
        for outcome in outcomes {
            if let FileOutcome::Scanned(found) = outcome {
                files_scanned += 1;
                complaints.extend(found);
            }
        }

        let mut result = aggregate(complaints);
        result.files_scanned = files_scanned;
        result.interrupted = self.cancel.is_cancelled();

        if result.interrupted {
            warn!("Scan interrupted; reporting partial results");
        }
        info!(
            "Scan complete: {} complaints in {} files",
            result.total, result.files_scanned
        );
        Ok(result)
    }

    /// Pairs every selected file with the rules that select it.
    fn plan<'r>(&'r self, candidates: &[PathBuf]) -> Vec<(PathBuf, Vec<&'r Complainer>)> {
        let mut by_file: BTreeMap<PathBuf, Vec<&Complainer>> = BTreeMap::new();
        for rule in &self.rules {
            let selected = rule.select(candidates);
            debug!(rule = rule.name(), files = selected.len(), "selected files");
            for path in selected {
                by_file.entry(path).or_default().push(rule);
            }
        }
        by_file.into_iter().collect()
    }

    fn scan_file(
        &self,
        source: &dyn SourceProvider,
        path: &Path,
        rules: &[&Complainer],
    ) -> Result<FileOutcome, ScanError> {
        if self.cancel.is_cancelled() {
            return Ok(FileOutcome::Skipped);
        }
        debug!("Scanning: {}", path.display());

        let text = match source.read(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return Ok(FileOutcome::Skipped);
            }
        };

        // A file that has been read runs at least its first rule.
        let mut complaints = Vec::new();
        for (i, rule) in rules.iter().enumerate() {
            if i > 0 && self.cancel.is_cancelled() {
                break;
            }
            let found = rule.find_matches(&text);
            for offset in &found.abandoned {
                warn!(
                    rule = rule.name(),
                    path = %path.display(),
                    offset,
                    limit = MAX_NESTING,
                    "grammar nesting limit reached; a possible match was not checked"
                );
            }
            for span in found.spans {
                debug_assert!(span.end <= text.len());
                let built = build(rule, path, &text, span).map_err(|source| ScanError::Hook {
                    rule: rule.name().to_string(),
                    path: path.to_path_buf(),
                    source,
                })?;
                complaints.extend(built);
            }
        }
        Ok(FileOutcome::Scanned(complaints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Capture;
    use crate::registry::ComplainerDef;
    use crate::source::MemorySource;
    use crate::types::Severity;

    fn rules(defs: Vec<ComplainerDef>) -> RuleSet {
        RuleSet::load(&[&defs], &Config::default()).unwrap()
    }

    fn todo_rule() -> ComplainerDef {
        ComplainerDef::new("todo", "TODO left in code")
            .capture(Capture::regex("TODO"))
            .severity(Severity::Warning)
            .include("*")
    }

    #[test]
    fn test_builder_defaults() {
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .build()
            .expect("Failed to build scanner");
        assert_eq!(scanner.rules().len(), 1);
        assert!(!scanner.cancel_token().is_cancelled());
    }

    #[test]
    fn test_global_excludes() {
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .exclude("vendor/**")
            .parallelism(1)
            .build()
            .unwrap();
        let source = MemorySource::new()
            .file("vendor/lib.py", "TODO")
            .file("src/lib.py", "TODO");
        let result = scanner.scan(&source).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.complaints[0].path, PathBuf::from("src/lib.py"));
    }

    #[test]
    fn test_invalid_exclude_is_a_load_error() {
        let result = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .exclude("[")
            .build();
        assert!(matches!(result, Err(LoadError::InvalidExclude { .. })));
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .build()
            .unwrap();
        let source = MemorySource::new()
            .bytes("blob.bin", vec![0xff, 0x00])
            .file("a.txt", "TODO");
        let result = scanner.scan(&source).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.files_scanned, 1);
    }

    #[test]
    fn test_config_supplies_parallelism_and_excludes() {
        let config = Config::parse("[scan]\nexclude = [\"*.md\"]\nparallelism = 2\n").unwrap();
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .config(&config)
            .build()
            .unwrap();
        let source = MemorySource::new().file("README.md", "TODO").file("a.py", "TODO");
        let result = scanner.scan(&source).unwrap();
        assert_eq!(result.total, 1);
    }

    #[test]
    fn test_cancel_before_scan() {
        let token = CancelToken::new();
        token.cancel();
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule()]))
            .cancel_token(token)
            .build()
            .unwrap();
        let result = scanner.scan(&MemorySource::new().file("a", "TODO")).unwrap();
        assert!(result.interrupted);
        assert!(result.is_clean());
        assert_eq!(result.files_scanned, 0);
    }

    /// Fires the token while the file is being read.
    struct CancelOnRead {
        inner: MemorySource,
        token: CancelToken,
    }

    impl SourceProvider for CancelOnRead {
        fn candidates(&self) -> Vec<PathBuf> {
            self.inner.candidates()
        }

        fn read(&self, path: &Path) -> std::io::Result<String> {
            self.token.cancel();
            self.inner.read(path)
        }
    }

    #[test]
    fn test_cancel_during_read_runs_only_the_first_rule() {
        let token = CancelToken::new();
        let fixme = ComplainerDef::new("fixme", "FIXME left in code")
            .capture(Capture::regex("FIXME"))
            .severity(Severity::Critical)
            .include("*");
        let scanner = Scanner::builder()
            .rules(rules(vec![todo_rule(), fixme]))
            .parallelism(1)
            .cancel_token(token.clone())
            .build()
            .unwrap();
        let source = CancelOnRead {
            inner: MemorySource::new()
                .file("a.py", "TODO FIXME")
                .file("b.py", "TODO FIXME"),
            token,
        };

        let result = scanner.scan(&source).unwrap();
        assert!(result.interrupted);
        assert_eq!(result.files_scanned, 1);
        let found: Vec<(&str, &str)> = result
            .complaints
            .iter()
            .map(|c| (c.path.to_str().unwrap(), c.rule.as_str()))
            .collect();
        assert_eq!(found, vec![("a.py", "todo")]);
    }

    #[test]
    fn test_too_deep_grammar_match_is_reported_not_matched() {
        use crate::pattern::{Expr, Grammar};

        let grammar = Grammar::new(Expr::literal("f").then(Expr::rule("call")))
            .nested("call", "(", ")");
        let defs = vec![ComplainerDef::new("call", "call found")
            .capture(grammar)
            .severity(Severity::Warning)
            .include("*")];
        let set = rules(defs);
        let rule = set.get("call").unwrap();

        let deep = |n: usize| format!("f{}{}", "(".repeat(n), ")".repeat(n));
        let at_limit = rule.find_matches(&deep(MAX_NESTING));
        assert_eq!(at_limit.spans.len(), 1);
        assert!(at_limit.abandoned.is_empty());

        let over_limit = rule.find_matches(&deep(MAX_NESTING + 1));
        assert!(over_limit.spans.is_empty());
        assert_eq!(over_limit.abandoned, vec![0]);

        let scanner = Scanner::builder().rules(set).parallelism(1).build().unwrap();
        let result = scanner
            .scan(&MemorySource::new().file("deep.txt", deep(MAX_NESTING + 1)))
            .unwrap();
        assert_eq!(result.files_scanned, 1);
        assert!(result.is_clean());
    }
}
