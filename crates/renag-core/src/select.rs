//! Per-rule file selection by include/exclude globs.

use glob::MatchOptions;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Errors from glob pattern construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobError {
    /// The pattern is an empty string.
    #[error("glob pattern is empty")]
    Empty,

    /// The pattern has invalid glob syntax.
    #[error("invalid glob `{pattern}`: {reason}")]
    Invalid {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A validated glob pattern for relative file paths.
///
/// A pattern without `/` (such as `*.py`) matches a file at any depth by its
/// name. A pattern with `/` is matched against the whole path relative to the
/// scan root, where `*` stays within one directory and `**` crosses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
    by_name: bool,
}

impl GlobPattern {
    /// Creates a new glob pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        if pattern.is_empty() {
            return Err(GlobError::Empty);
        }
        let normalized = pattern.strip_prefix("./").unwrap_or(pattern);
        let compiled = glob::Pattern::new(normalized).map_err(|e| GlobError::Invalid {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
            by_name: !normalized.contains('/'),
        })
    }

    /// Tests whether a relative file path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = normalize(path);
        if self.by_name {
            let name = path_str.rsplit('/').next().unwrap_or(&path_str);
            return self.compiled.matches_with(name, MATCH_OPTIONS);
        }
        if self.compiled.matches_with(&path_str, MATCH_OPTIONS) {
            return true;
        }
        // `dir/**` also covers everything below `dir`.
        if let Some(prefix) = self.compiled.as_str().strip_suffix("/**") {
            let prefix = prefix.trim_end_matches('/');
            if path_str.starts_with(prefix)
                && path_str
                    .as_bytes()
                    .get(prefix.len())
                    .is_some_and(|&b| b == b'/')
            {
                return true;
            }
        }
        false
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Compiles a list of patterns.
///
/// # Errors
///
/// Returns the first pattern error.
pub fn compile_globs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<GlobPattern>, GlobError> {
    patterns.iter().map(|p| GlobPattern::new(p.as_ref())).collect()
}

/// `/`-separated form of a relative path, without a leading `./`.
fn normalize(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    match s.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Orders paths by their `/`-separated text, so `a.py` sorts before `a/z.py`.
pub(crate) fn path_order(a: &Path, b: &Path) -> Ordering {
    normalize(a).cmp(&normalize(b))
}

/// Include/exclude globs of one rule.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
}

impl FileFilter {
    /// Creates a filter.
    #[must_use]
    pub fn new(include: Vec<GlobPattern>, exclude: Vec<GlobPattern>) -> Self {
        Self { include, exclude }
    }

    /// Include patterns.
    #[must_use]
    pub fn include(&self) -> &[GlobPattern] {
        &self.include
    }

    /// Exclude patterns.
    #[must_use]
    pub fn exclude(&self) -> &[GlobPattern] {
        &self.exclude
    }

    /// A path is selected if it matches an include and no exclude pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.include.iter().any(|g| g.matches(path)) && !self.exclude.iter().any(|g| g.matches(path))
    }
}

/// Selects the candidates a filter accepts, sorted lexicographically.
///
/// No file is opened; this is pure path matching.
#[must_use]
pub fn select(filter: &FileFilter, candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut selected: Vec<PathBuf> = candidates
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    selected.sort_by(|a, b| path_order(a, b));
    selected.dedup_by(|a, b| path_order(a, b) == Ordering::Equal);
    selected
}
