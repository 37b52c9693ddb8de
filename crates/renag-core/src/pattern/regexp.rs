//! Regex captures.

use regex::{Regex, RegexBuilder};

use super::{Matcher, Matches, PatternError};
use crate::types::Span;

/// Flags applied when compiling a regex capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// Case-insensitive matching (`i`).
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries (`m`).
    pub multi_line: bool,
    /// `.` also matches `\n` (`s`).
    pub dot_matches_new_line: bool,
    /// Whitespace and `#` comments in the pattern are ignored (`x`).
    pub ignore_whitespace: bool,
}

/// A regex capture: source text plus flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexCapture {
    /// Pattern source.
    pub source: String,
    /// Compile flags.
    pub options: RegexOptions,
}

impl RegexCapture {
    /// Creates a capture with default flags.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            options: RegexOptions::default(),
        }
    }

    /// Sets the compile flags.
    #[must_use]
    pub fn with_options(mut self, options: RegexOptions) -> Self {
        self.options = options;
        self
    }

    /// Compiles the capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty or is not a valid regex.
    pub fn compile(&self) -> Result<RegexMatcher, PatternError> {
        if self.source.is_empty() {
            return Err(PatternError::Empty);
        }
        let regex = RegexBuilder::new(&self.source)
            .case_insensitive(self.options.case_insensitive)
            .multi_line(self.options.multi_line)
            .dot_matches_new_line(self.options.dot_matches_new_line)
            .ignore_whitespace(self.options.ignore_whitespace)
            .build()?;
        Ok(RegexMatcher { regex })
    }
}

/// Finds all regex matches over the whole file content.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl Matcher for RegexMatcher {
    fn find_matches(&self, text: &str) -> Matches {
        Matches {
            spans: self
                .regex
                .find_iter(text)
                .map(|m| Span::new(m.start(), m.end()))
                .collect(),
            abandoned: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(source: &str, text: &str) -> Vec<Span> {
        RegexCapture::new(source).compile().unwrap().find_spans(text)
    }

    #[test]
    fn finds_non_overlapping_matches() {
        assert_eq!(spans("aa", "aaaaa"), vec![Span::new(0, 2), Span::new(2, 4)]);
    }

    #[test]
    fn matches_may_span_lines() {
        let text = "begin\nx\nend";
        assert_eq!(spans(r"begin\s+x\s+end", text), vec![Span::new(0, 11)]);
    }

    #[test]
    fn options_are_applied() {
        let capture = RegexCapture::new("^todo").with_options(RegexOptions {
            case_insensitive: true,
            multi_line: true,
            ..RegexOptions::default()
        });
        let found = capture.compile().unwrap().find_spans("x\nTODO\ntodo");
        assert_eq!(found, vec![Span::new(2, 6), Span::new(7, 11)]);
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(
            RegexCapture::new("").compile(),
            Err(PatternError::Empty)
        ));
    }

    #[test]
    fn invalid_source_is_rejected() {
        assert!(matches!(
            RegexCapture::new("print(").compile(),
            Err(PatternError::Regex(_))
        ));
    }
}
