//! Capture patterns and the matchers compiled from them.
//!
//! A complainer's capture is either a regular expression or a
//! parsing-expression grammar. Both compile to a [`Matcher`], and the rest
//! of the engine only ever sees `find_spans`.
//!
//! ```text
//! Capture::Regex   ──compile──▶ RegexMatcher   ┐
//!                                               ├─▶ Box<dyn Matcher>
//! Capture::Grammar ──compile──▶ GrammarMatcher ┘
//! ```

mod peg;
mod regexp;

pub use peg::{Expr, Grammar, GrammarMatcher, MAX_NESTING};
pub use regexp::{RegexCapture, RegexMatcher, RegexOptions};

use crate::types::Span;

/// Everything a matcher found in one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Matches, left to right.
    pub spans: Vec<Span>,
    /// Byte offsets where a grammar match attempt was abandoned at
    /// [`MAX_NESTING`]. Always empty for regex captures.
    pub abandoned: Vec<usize>,
}

/// Finds all non-overlapping matches of a compiled capture in a text.
///
/// Implementations are pure: the same text always yields the same spans,
/// left to right, each satisfying `start <= end <= text.len()`.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns every match in `text` plus any abandoned attempts.
    fn find_matches(&self, text: &str) -> Matches;

    /// Returns every match in `text`, in left-to-right order.
    fn find_spans(&self, text: &str) -> Vec<Span> {
        self.find_matches(text).spans
    }
}

/// Type alias for boxed matchers.
pub type MatcherBox = Box<dyn Matcher>;

/// Errors raised while compiling a capture pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The regex source is empty.
    #[error("capture pattern is empty")]
    Empty,

    /// The regex failed to compile.
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// A grammar rule references a rule that was never defined.
    #[error("grammar rule `{rule}` references undefined rule `{target}`")]
    UndefinedRule {
        /// Rule containing the reference.
        rule: String,
        /// The missing rule name.
        target: String,
    },

    /// A regex terminal inside a grammar failed to compile.
    #[error("invalid regex terminal `{pattern}` in grammar rule `{rule}`: {source}")]
    Terminal {
        /// Rule containing the terminal.
        rule: String,
        /// Terminal source.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// A grammar rule can reach itself without consuming input.
    #[error("grammar rule `{0}` is left-recursive")]
    LeftRecursion(String),
}

/// The pattern a complainer uses to find candidate text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// A regular expression.
    Regex(RegexCapture),
    /// A parsing-expression grammar.
    Grammar(Grammar),
}

impl Capture {
    /// Creates a regex capture with default options.
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Self::Regex(RegexCapture::new(source))
    }

    /// Short name of the pattern kind, for logs and listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Regex(_) => "regex",
            Self::Grammar(_) => "grammar",
        }
    }

    /// Compiles the capture into a matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex or any grammar terminal fails to compile,
    /// or if the grammar is malformed.
    pub fn compile(&self) -> Result<MatcherBox, PatternError> {
        Ok(match self {
            Self::Regex(capture) => Box::new(capture.compile()?),
            Self::Grammar(grammar) => Box::new(grammar.compile()?),
        })
    }
}

impl From<RegexCapture> for Capture {
    fn from(capture: RegexCapture) -> Self {
        Self::Regex(capture)
    }
}

impl From<Grammar> for Capture {
    fn from(grammar: Grammar) -> Self {
        Self::Grammar(grammar)
    }
}

/// Byte offset of the character boundary after `pos`.
pub(crate) fn next_boundary(text: &str, pos: usize) -> usize {
    pos + text
        .get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}
