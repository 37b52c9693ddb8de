//! Complainer for leftover `print(...)` debugging calls in Python.
//!
//! # Detected Patterns
//!
//! - `print(...)` and `print (...)` anywhere in a `*.py` file
//!
//! # Allowed Patterns
//!
//! ```text
//! # print(x)        <- commented out, suppressed
//! logger.debug(x)
//! ```

use renag_core::hooks::skip_commented;
use renag_core::{Capture, ComplainerDef, Severity};

/// Rule name for debug-print.
pub const NAME: &str = "debug-print";

/// Flags `print(` calls that are not commented out.
#[derive(Debug, Clone)]
pub struct DebugPrint {
    /// Severity level.
    pub severity: Severity,
}

impl Default for DebugPrint {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugPrint {
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
        ComplainerDef::new(NAME, "print() call left in the code.")
            .capture(Capture::regex(r"\bprint\s*\("))
            .severity(self.severity)
            .include("*.py")
            .help("Use the logging module, or remove the call.")
            .hook(skip_commented("#"))
    }
}
