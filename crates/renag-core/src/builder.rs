//! Turning a match into complaints.
//!
//! Every match goes through [`build`]. A rule without a hook gets exactly one
//! complaint from [`build_default`]. A rule with a hook hands the match to it
//! as a [`Check`]; the hook decides what to emit and calls back into the
//! default builder when it wants the standard complaint.

use std::path::Path;
use std::sync::Arc;

use crate::registry::Complainer;
use crate::resolve::resolve;
use crate::types::{Complaint, Location, Span};

/// A validation hook: receives one match and returns the complaints to emit.
///
/// Hooks must be pure functions of the [`Check`] they receive.
pub type CheckHook = Arc<dyn Fn(&Check<'_>) -> Result<Vec<Complaint>, HookError> + Send + Sync>;

/// Error raised by a validation hook. Aborts the scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Creates a hook error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One match, as seen by a validation hook.
#[derive(Debug, Clone, Copy)]
pub struct Check<'a> {
    /// The rule that matched.
    pub rule: &'a Complainer,
    /// File path relative to the scan root.
    pub path: &'a Path,
    /// Full content of the file.
    pub text: &'a str,
    /// The matched span.
    pub span: Span,
}

impl<'a> Check<'a> {
    /// The complaints the rule would emit without a hook.
    #[must_use]
    pub fn default_complaints(&self) -> Vec<Complaint> {
        vec![build_default(self.rule, self.path, self.text, self.span)]
    }

    /// A complaint for this match with a custom message.
    #[must_use]
    pub fn complaint(&self, message: impl Into<String>) -> Complaint {
        build_default(self.rule, self.path, self.text, self.span).with_message(message)
    }

    /// The matched text.
    #[must_use]
    pub fn matched(&self) -> &'a str {
        self.span.slice(self.text).unwrap_or("")
    }

    /// Text between the start of the match's first line and the match.
    #[must_use]
    pub fn line_prefix(&self) -> &'a str {
        let before = self.text.get(..self.span.start).unwrap_or("");
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        &before[line_start..]
    }

    /// Resolved position of the match.
    #[must_use]
    pub fn location(&self) -> Location {
        resolve(self.text, self.span)
    }
}

/// Builds the standard complaint for a match: the rule's description as the
/// message, the rule's severity, and the resolved span.
#[must_use]
pub fn build_default(rule: &Complainer, path: &Path, text: &str, span: Span) -> Complaint {
    let complaint = Complaint::new(
        rule.name(),
        rule.severity(),
        path,
        span,
        resolve(text, span),
        rule.description(),
    );
    match rule.help() {
        Some(help) => complaint.with_help(help),
        None => complaint,
    }
}

/// Builds the complaints for one match, running the rule's hook if it has one.
///
/// A configured severity override is applied to every complaint the hook
/// emits under the rule's own name.
///
/// # Errors
///
/// Returns the hook's error, or an error if the hook emits a complaint whose
/// span does not fit the file.
pub fn build(
    rule: &Complainer,
    path: &Path,
    text: &str,
    span: Span,
) -> Result<Vec<Complaint>, HookError> {
    let Some(hook) = rule.hook() else {
        return Ok(vec![build_default(rule, path, text, span)]);
    };

    let check = Check {
        rule,
        path,
        text,
        span,
    };
    let mut complaints = hook(&check)?;

    for complaint in &mut complaints {
        if Span::checked(complaint.span.start, complaint.span.end, text.len()).is_none() {
            return Err(HookError::new(format!(
                "hook emitted span {}..{} outside a file of {} bytes",
                complaint.span.start,
                complaint.span.end,
                text.len()
            )));
        }
        if let Some(severity) = rule.severity_override() {
            if complaint.rule == rule.name() {
                complaint.severity = severity;
            }
        }
    }
    Ok(complaints)
}
