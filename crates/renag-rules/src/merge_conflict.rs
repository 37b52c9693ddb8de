//! Complainer for unresolved merge-conflict markers in any file.

use renag_core::{Capture, ComplainerDef, RegexCapture, RegexOptions, Severity};

/// Rule name for merge-conflict-marker.
pub const NAME: &str = "merge-conflict-marker";

/// Flags lines made of a conflict marker (`<<<<<<<`, `|||||||`, `=======`,
/// `>>>>>>>`), optionally followed by a label.
#[derive(Debug, Clone, Default)]
pub struct MergeConflictMarker;

impl MergeConflictMarker {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the complainer definition.
    #[must_use]
    pub fn definition(&self) -> ComplainerDef {
        let capture = RegexCapture::new(r"^(?:<{7}|\|{7}|={7}|>{7})(?: [^\n]*)?\r?$").with_options(
            RegexOptions {
                multi_line: true,
                ..RegexOptions::default()
            },
        );
        ComplainerDef::new(NAME, "Unresolved merge conflict marker.")
            .capture(Capture::Regex(capture))
            .severity(Severity::Critical)
            .include("*")
            .help("Resolve the conflict and remove the markers.")
    }
}
