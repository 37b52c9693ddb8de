//! Ready-made validation hooks.
//!
//! These are the hooks a declarative `[[complainer]]` table can select by key.

use std::sync::Arc;

use crate::builder::{Check, CheckHook};

/// Suppresses a match when `marker` occurs on its first line before the match
/// starts, i.e. the match sits inside a line comment.
///
/// ```
/// use renag_core::hooks::skip_commented;
///
/// let hook = skip_commented("#");
/// # let _ = hook;
/// ```
#[must_use]
pub fn skip_commented(marker: impl Into<String>) -> CheckHook {
    let marker = marker.into();
    Arc::new(move |check: &Check<'_>| {
        if check.line_prefix().contains(marker.as_str()) {
            Ok(Vec::new())
        } else {
            Ok(check.default_complaints())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::pattern::Capture;
    use crate::registry::{Complainer, ComplainerDef};
    use crate::types::{Severity, Span};
    use std::path::Path;

    fn print_rule() -> Complainer {
        Complainer::from_def(
            ComplainerDef::new("debug-print", "print() left in code")
                .capture(Capture::regex(r"print\(.*\)"))
                .severity(Severity::Warning)
                .include("*.py")
                .hook(skip_commented("#")),
        )
        .unwrap()
    }

    fn complaints_for(text: &str) -> usize {
        let rule = print_rule();
        rule.find_spans(text)
            .into_iter()
            .map(|span| build(&rule, Path::new("a.py"), text, span).unwrap().len())
            .sum()
    }

    #[test]
    fn commented_out_match_is_suppressed() {
        assert_eq!(complaints_for("# print(\"hi\")\n"), 0);
    }

    #[test]
    fn trailing_comment_does_not_suppress() {
        assert_eq!(complaints_for("print(\"hi\")  # debug\n"), 1);
    }

    #[test]
    fn comment_on_previous_line_does_not_suppress() {
        assert_eq!(complaints_for("# note\nprint(1)\n"), 1);
    }

    #[test]
    fn marker_is_configurable() {
        let rule = Complainer::from_def(
            ComplainerDef::new("dbg", "dbg! left in code")
                .capture(Capture::regex(r"dbg!"))
                .severity(Severity::Critical)
                .include("*.rs")
                .hook(skip_commented("//")),
        )
        .unwrap();
        let text = "// dbg!(x)\ndbg!(y)\n";
        let total: usize = rule
            .find_spans(text)
            .into_iter()
            .map(|span| build(&rule, Path::new("a.rs"), text, span).unwrap().len())
            .sum();
        assert_eq!(total, 1);
        assert_eq!(rule.find_spans(text)[1], Span::new(11, 15));
    }
}
