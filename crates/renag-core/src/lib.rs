//! # renag-core
//!
//! Core engine for renag, a language-agnostic, pattern-based linter.
//!
//! Rules ("complainers") are regular expressions or parsing-expression
//! grammars rather than a fixed syntax tree, so one engine serves any target
//! language. This crate provides:
//!
//! - [`ComplainerDef`] / [`Complainer`] / [`RuleSet`] for defining and
//!   validating rules
//! - [`Capture`] and the [`Matcher`] trait (regex and grammar matchers)
//! - [`resolve`] for turning byte spans into lines and carets
//! - [`build`] / [`build_default`] and the [`CheckHook`] customization point
//! - [`Scanner`] for orchestrating a (parallel) scan
//! - [`aggregate`] and [`render`] for the final result and exit code
//!
//! ## Example
//!
//! ```
//! use renag_core::{
//!     render, Capture, ComplainerDef, Config, MemorySource, ReportStyle, RuleSet, Scanner,
//!     Severity,
//! };
//!
//! let defs = vec![ComplainerDef::new("todo", "TODO left in code")
//!     .capture(Capture::regex("TODO"))
//!     .severity(Severity::Warning)
//!     .include("*.py")];
//! let rules = RuleSet::load(&[&defs], &Config::default())?;
//!
//! let scanner = Scanner::builder().rules(rules).build()?;
//! let source = MemorySource::new().file("app.py", "# TODO: remove\n");
//! let result = scanner.scan(&source)?;
//!
//! let report = render(&result, &ReportStyle::plain());
//! assert_eq!(report.exit_code, 0);
//! assert_eq!(result.warnings, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod builder;
mod config;
mod pattern;
mod registry;
mod report;
mod resolve;
mod scanner;
mod select;
mod source;
mod types;

/// TOML-defined complainers.
pub mod declarative;
/// Ready-made validation hooks.
pub mod hooks;

pub use aggregate::{aggregate, report_order};
pub use builder::{build, build_default, Check, CheckHook, HookError};
pub use config::{Config, ConfigError, RuleConfig, ScanConfig};
pub use pattern::{
    Capture, Expr, Grammar, GrammarMatcher, Matcher, MatcherBox, Matches, PatternError,
    RegexCapture, RegexMatcher, RegexOptions, MAX_NESTING,
};
pub use registry::{Complainer, ComplainerDef, ComplainerSource, LoadError, RuleSet};
pub use report::{render, summary_line, ExitStatus, Report, ReportStyle};
pub use resolve::resolve;
pub use scanner::{CancelToken, ScanError, Scanner, ScannerBuilder};
pub use select::{compile_globs, select, FileFilter, GlobError, GlobPattern};
pub use source::{FsSource, MemorySource, SourceProvider};
pub use types::{Complaint, Location, ScanResult, Severity, SourceLine, Span};
