//! Core types for complaints and scan results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for complaints.
///
/// Ordered so that `Critical > Warning`; only critical complaints fail a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, but does not fail the run.
    Warning,
    /// Reported and fails the run with exit code 1.
    Critical,
}

impl Severity {
    /// Parses a severity name (`"warning"` or `"critical"`, any case).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Half-open byte interval `[start, end)` into one file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `start > end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is past its end {end}");
        Self { start, end }
    }

    /// Creates a span only if it fits inside a text of length `len`.
    #[must_use]
    pub fn checked(start: usize, end: usize, len: usize) -> Option<Self> {
        (start <= end && end <= len).then_some(Self { start, end })
    }

    /// Width of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true for a zero-width span.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the covered text, or `None` if the span is out of bounds
    /// or not on character boundaries.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.start..self.end)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A numbered line of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// Line number (1-indexed).
    pub number: usize,
    /// Line text without its terminator.
    pub text: String,
}

/// A span resolved against its file: line numbers, line texts and a caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// First covered line (1-indexed).
    pub first_line: usize,
    /// Last covered line (1-indexed).
    pub last_line: usize,
    /// Column of the span start on the first line (1-indexed, in characters).
    pub column: usize,
    /// The covered line for a single-line span; first and last line otherwise.
    pub lines: Vec<SourceLine>,
    /// Underline for single-line spans (`"    ^^^^"`); `None` for multi-line.
    pub caret: Option<String>,
}

impl Location {
    /// Returns true if the span crosses a line boundary.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.last_line > self.first_line
    }

    /// Text of the first covered line.
    #[must_use]
    pub fn first_line_text(&self) -> &str {
        self.lines.first().map_or("", |l| l.text.as_str())
    }
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    /// Name of the complainer that produced this complaint.
    pub rule: String,
    /// Severity of this complaint.
    pub severity: Severity,
    /// File path relative to the scan root.
    pub path: PathBuf,
    /// Byte span of the match.
    pub span: Span,
    /// Human-readable message.
    pub message: String,
    /// Optional hint on how to fix the problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Resolved position of `span`.
    pub location: Location,
}

impl Complaint {
    /// Creates a new complaint.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        path: impl Into<PathBuf>,
        span: Span,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            path: path.into(),
            span,
            message: message.into(),
            help: None,
            location,
        }
    }

    /// Adds a help line to this complaint.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Replaces the message of this complaint.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl std::fmt::Display for Complaint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.path.display(),
            self.location.first_line,
            self.location.column,
            self.severity,
            self.rule,
            self.message
        )
    }
}

/// Result of one scan: the sorted complaints and their counts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// All complaints, in report order.
    pub complaints: Vec<Complaint>,
    /// Number of complaints.
    pub total: usize,
    /// Number of warning complaints.
    pub warnings: usize,
    /// Number of critical complaints.
    pub criticals: usize,
    /// Number of files that were read and matched.
    pub files_scanned: usize,
    /// True if the scan was cancelled before all work was issued.
    #[serde(default)]
    pub interrupted: bool,
}

impl ScanResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any critical complaints.
    #[must_use]
    pub fn has_criticals(&self) -> bool {
        self.criticals > 0
    }

    /// Returns true if there are no complaints at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}
