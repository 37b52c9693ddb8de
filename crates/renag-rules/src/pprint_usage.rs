//! Complainer for `pprint(...)` calls in Python, matched with a grammar.
//!
//! A regex cannot find the closing parenthesis of a call whose arguments
//! nest, so this rule uses a balanced-delimiter grammar. Comments and
//! string literals are ignored, so `pprint(` inside either never matches
//! and a `)` inside a string argument does not end the call.
//!
//! Test modules (`test_*.py`) are excluded.

use renag_core::{ComplainerDef, Expr, Grammar, Severity};

/// Rule name for pprint-usage.
pub const NAME: &str = "pprint-usage";

/// Flags complete `pprint(...)` calls, including multi-line ones.
#[derive(Debug, Clone)]
pub struct PprintUsage {
    /// Severity level.
    pub severity: Severity,
}

impl Default for PprintUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl PprintUsage {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the complainer definition.
    #[must_use]
    pub fn definition(&self) -> ComplainerDef {
        ComplainerDef::new(NAME, "pprint() call left in the code.")
            .capture(grammar())
            .severity(self.severity)
            .include("*.py")
            .exclude("test_*.py")
            .help("Use the logging module with pprint.pformat() instead.")
    }
}

fn grammar() -> Grammar {
    Grammar::new(Expr::literal("pprint").then(Expr::rule("call")))
        .nested("call", "(", ")")
        .ignore(Expr::regex(r"#[^\n]*"))
        .ignore(Expr::regex(r#""""(?s:.*?)""""#))
        .ignore(Expr::regex(r"'''(?s:.*?)'''"))
        .ignore(Expr::regex(r#""(?:[^"\\\n]|\\.)*""#))
        .ignore(Expr::regex(r"'(?:[^'\\\n]|\\.)*'"))
        .skip_whitespace(true)
}
