//! Shared output formatting for scan results.

use anyhow::Result;
use renag_core::{render, summary_line, ReportStyle, ScanResult};

use crate::OutputFormat;

/// Formats a scan result in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format(result: &ScanResult, format: OutputFormat, style: ReportStyle) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render(result, &style).text),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Compact => Ok(format_compact(result)),
    }
}

/// One `path:line:col: SEVERITY [rule] message` line per complaint, then the
/// summary.
fn format_compact(result: &ScanResult) -> String {
    let mut out = String::new();
    for complaint in &result.complaints {
        out.push_str(&complaint.to_string());
        out.push('\n');
    }
    out.push_str(&summary_line(result));
    out
}

/// Decides whether text output is coloured.
///
/// `--no-color` wins, then `[scan] color`, then terminal detection
/// (which honours `NO_COLOR` and `CLICOLOR`).
#[must_use]
pub fn style(no_color: bool, configured: Option<bool>) -> ReportStyle {
    let color = if no_color {
        false
    } else {
        configured.unwrap_or_else(console::colors_enabled)
    };
    if color {
        ReportStyle::colored()
    } else {
        ReportStyle::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renag_core::{Capture, ComplainerDef, Config, MemorySource, RuleSet, Scanner, Severity};

    fn sample() -> ScanResult {
        let defs = vec![ComplainerDef::new("no-todo", "TODO left.")
            .capture(Capture::regex("TODO"))
            .severity(Severity::Critical)
            .include("*")];
        let rules = RuleSet::load(&[&defs], &Config::default()).unwrap();
        Scanner::builder()
            .rules(rules)
            .parallelism(1)
            .build()
            .unwrap()
            .scan(&MemorySource::new().file("src/a.py", "x = 1\n  TODO\n"))
            .unwrap()
    }

    #[test]
    fn compact_has_one_line_per_complaint_and_summary() {
        let out = format(&sample(), OutputFormat::Compact, ReportStyle::plain()).unwrap();
        assert_eq!(
            out,
            "src/a.py:2:3: CRITICAL [no-todo] TODO left.\n\
             1 Complaints found: 0 Warnings, 1 Critical."
        );
    }

    #[test]
    fn json_serializes_the_result() {
        let out = format(&sample(), OutputFormat::Json, ReportStyle::plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["criticals"], 1);
        assert_eq!(value["complaints"][0]["rule"], "no-todo");
        assert_eq!(value["complaints"][0]["severity"], "critical");
    }

    #[test]
    fn text_uses_the_report_layout() {
        let out = format(&sample(), OutputFormat::Text, ReportStyle::plain()).unwrap();
        assert!(out.starts_with("CRITICAL - no-todo: TODO left."));
        assert!(out.contains(" --> src/a.py:2:3"));
    }

    #[test]
    fn no_color_flag_beats_config() {
        assert_eq!(style(true, Some(true)), ReportStyle::plain());
        assert_eq!(style(false, Some(true)), ReportStyle::colored());
        assert_eq!(style(false, Some(false)), ReportStyle::plain());
    }
}
