//! # renag-rules
//!
//! Built-in complainers for renag.
//!
//! ## Available Rules
//!
//! | Name | Severity | Files | Description |
//! |------|----------|-------|-------------|
//! | `debug-print` | warning | `*.py` | `print(` calls that are not commented out |
//! | `pprint-usage` | warning | `*.py` except `test_*.py` | complete `pprint(...)` calls, grammar-matched |
//! | `merge-conflict-marker` | critical | `*` | unresolved conflict markers |
//!
//! ## Usage
//!
//! ```
//! use renag_core::{Config, RuleSet};
//! use renag_rules::BuiltinRules;
//!
//! let rules = RuleSet::load(&[&BuiltinRules], &Config::default())?;
//! assert_eq!(rules.len(), 3);
//! # Ok::<(), renag_core::LoadError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod debug_print;
mod merge_conflict;
mod pprint_usage;

pub use debug_print::DebugPrint;
pub use merge_conflict::MergeConflictMarker;
pub use pprint_usage::PprintUsage;

use renag_core::{ComplainerDef, ComplainerSource, LoadError};

/// Re-export core types for convenience.
pub use renag_core::{Complaint, Severity};

/// Returns the definitions of every built-in complainer.
#[must_use]
pub fn builtin_complainers() -> Vec<ComplainerDef> {
    vec![
        DebugPrint::new().definition(),
        PprintUsage::new().definition(),
        MergeConflictMarker::new().definition(),
    ]
}

/// The built-in complainers as a rule source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRules;

impl ComplainerSource for BuiltinRules {
    fn name(&self) -> &str {
        "built-in rules"
    }

    fn complainers(&self) -> Result<Vec<ComplainerDef>, LoadError> {
        let defs = builtin_complainers();
        tracing::debug!(count = defs.len(), "providing built-in complainers");
        Ok(defs)
    }
}
