//! Rendering a [`ScanResult`] as text and deciding the exit status.
//!
//! ```text
//! WARNING - debug-print: print() left in code
//!  --> src/app.py:2:5
//!      2|     print(x)
//!       |     ^^^^^^^^
//!   = help: use the logging module
//!
//! 1 Complaints found: 1 Warnings, 0 Critical.
//! ```

use console::Style;

use crate::types::{Complaint, ScanResult, Severity};

const SUCCESS: &str = "No complaints. Enjoy the rest of your day!";
const INTERRUPTED: &str = "Scan interrupted; complaints above are partial.";

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No complaints, or warnings only.
    Clean,
    /// At least one critical complaint.
    Critical,
    /// Rules or configuration failed to load.
    LoadFailure,
    /// The scan itself failed (hook error, listing failure).
    ScanFailure,
}

impl ExitStatus {
    /// Status for a completed scan.
    #[must_use]
    pub fn for_result(result: &ScanResult) -> Self {
        if result.has_criticals() {
            Self::Critical
        } else {
            Self::Clean
        }
    }

    /// Numeric process exit code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Critical => 1,
            Self::LoadFailure => 2,
            Self::ScanFailure => 3,
        }
    }
}

/// Text styling options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStyle {
    /// Emit ANSI colours.
    pub color: bool,
}

impl ReportStyle {
    /// No colours.
    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// ANSI colours.
    #[must_use]
    pub fn colored() -> Self {
        Self { color: true }
    }

    fn theme(self) -> Theme {
        if self.color {
            Theme::colored()
        } else {
            Theme::plain()
        }
    }
}

struct Theme {
    warning: Style,
    critical: Style,
    rule: Style,
    path: Style,
    gutter: Style,
    caret: Style,
    help: Style,
    success: Style,
    summary: Style,
}

impl Theme {
    fn colored() -> Self {
        let forced = || Style::new().force_styling(true);
        Self {
            warning: forced().yellow().bold(),
            critical: forced().red().bold(),
            rule: forced().bold(),
            path: forced().magenta(),
            gutter: forced().dim(),
            caret: forced().cyan(),
            help: forced().blue(),
            success: forced().green(),
            summary: forced().bold(),
        }
    }

    fn plain() -> Self {
        Self {
            warning: Style::new(),
            critical: Style::new(),
            rule: Style::new(),
            path: Style::new(),
            gutter: Style::new(),
            caret: Style::new(),
            help: Style::new(),
            success: Style::new(),
            summary: Style::new(),
        }
    }

    fn severity(&self, severity: Severity) -> &Style {
        match severity {
            Severity::Warning => &self.warning,
            Severity::Critical => &self.critical,
        }
    }
}

/// Rendered output plus exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Text to print.
    pub text: String,
    /// Process exit code.
    pub exit_code: i32,
}

/// Renders every complaint, then a summary (or the success message).
///
/// `exit_code` is 1 exactly when the result holds a critical complaint.
#[must_use]
pub fn render(result: &ScanResult, style: &ReportStyle) -> Report {
    let theme = style.theme();
    let mut blocks: Vec<String> = result
        .complaints
        .iter()
        .map(|c| render_complaint(c, &theme))
        .collect();

    if result.is_clean() {
        blocks.push(theme.success.apply_to(SUCCESS).to_string());
    } else {
        blocks.push(theme.summary.apply_to(summary_line(result)).to_string());
    }

    let mut text = blocks.join("\n\n");
    if result.interrupted {
        text.push('\n');
        text.push_str(INTERRUPTED);
    }

    Report {
        text,
        exit_code: ExitStatus::for_result(result).code(),
    }
}

/// `"{N} Complaints found: {W} Warnings, {C} Critical."`
#[must_use]
pub fn summary_line(result: &ScanResult) -> String {
    format!(
        "{} Complaints found: {} Warnings, {} Critical.",
        result.total, result.warnings, result.criticals
    )
}

fn render_complaint(complaint: &Complaint, theme: &Theme) -> String {
    let loc = &complaint.location;
    let mut out = vec![
        format!(
            "{} - {}: {}",
            theme.severity(complaint.severity).apply_to(complaint.severity),
            theme.rule.apply_to(&complaint.rule),
            complaint.message
        ),
        format!(
            " --> {}",
            theme.path.apply_to(format!(
                "{}:{}:{}",
                complaint.path.display(),
                loc.first_line,
                loc.column
            ))
        ),
    ];

    let gutter = |label: &str| theme.gutter.apply_to(format!("{label:>6}|")).to_string();

    for (i, line) in loc.lines.iter().enumerate() {
        if i > 0 && line.number > loc.lines[i - 1].number + 1 {
            out.push(gutter("..."));
        }
        out.push(format!("{} {}", gutter(&line.number.to_string()), line.text));
    }
    if let Some(caret) = &loc.caret {
        out.push(format!("{} {}", gutter(""), theme.caret.apply_to(caret)));
    }
    if let Some(help) = &complaint.help {
        out.push(format!("  {}", theme.help.apply_to(format!("= help: {help}"))));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::resolve::resolve;
    use crate::types::Span;

    fn complaint(rule: &str, severity: Severity, path: &str, text: &str, span: Span) -> Complaint {
        Complaint::new(rule, severity, path, span, resolve(text, span), format!("{rule} found"))
    }

    #[test]
    fn renders_single_line_complaint() {
        let text = "x = 1\n    print(x)\n";
        let result = aggregate(vec![complaint(
            "debug-print",
            Severity::Warning,
            "src/app.py",
            text,
            Span::new(10, 18),
        )
        .with_help("use logging")]);

        let report = render(&result, &ReportStyle::plain());
        assert_eq!(report.exit_code, 0);
        insta::assert_snapshot!(report.text, @r"
WARNING - debug-print: debug-print found
 --> src/app.py:2:5
     2|     print(x)
      |     ^^^^^^^^
  = help: use logging

1 Complaints found: 1 Warnings, 0 Critical.
");
    }

    #[test]
    fn renders_multi_line_complaint_without_caret() {
        let mut text = String::new();
        for i in 1..=9 {
            text.push_str(&format!("# line {i}\n"));
        }
        let start = text.len();
        text.push_str("pprint(\n    x,\n)\n");
        let end = text.len() - 1;

        let result = aggregate(vec![complaint(
            "pprint-usage",
            Severity::Critical,
            "a.py",
            &text,
            Span::new(start, end),
        )]);
        let report = render(&result, &ReportStyle::plain());
        assert_eq!(report.exit_code, 1);
        insta::assert_snapshot!(report.text, @r"
CRITICAL - pprint-usage: pprint-usage found
 --> a.py:10:1
    10| pprint(
   ...|
    12| )

1 Complaints found: 0 Warnings, 1 Critical.
");
    }

    #[test]
    fn renders_success_message_when_clean() {
        let report = render(&ScanResult::new(), &ReportStyle::plain());
        assert_eq!(report.text, SUCCESS);
        assert_eq!(report.exit_code, 0);
    }

    #[test]
    fn exit_code_is_one_iff_critical() {
        let text = "ab";
        let warning = complaint("w", Severity::Warning, "a", text, Span::new(0, 1));
        let critical = complaint("c", Severity::Critical, "a", text, Span::new(1, 2));

        let only_warnings = aggregate(vec![warning.clone(), warning.clone()]);
        assert_eq!(render(&only_warnings, &ReportStyle::plain()).exit_code, 0);

        let mixed = aggregate(vec![warning, critical]);
        assert_eq!(render(&mixed, &ReportStyle::plain()).exit_code, 1);
    }

    #[test]
    fn complaints_render_in_result_order() {
        let text = "1\n2\n3\n4\n5\n";
        let result = aggregate(vec![
            complaint("r", Severity::Warning, "b.py", text, Span::new(2, 3)),
            complaint("r", Severity::Warning, "a.py", text, Span::new(8, 9)),
        ]);
        let report = render(&result, &ReportStyle::plain());
        let a = report.text.find("a.py:5").unwrap();
        let b = report.text.find("b.py:2").unwrap();
        assert!(a < b);
    }

    #[test]
    fn interrupted_scan_is_noted() {
        let mut result = ScanResult::new();
        result.interrupted = true;
        let report = render(&result, &ReportStyle::plain());
        assert!(report.text.ends_with(INTERRUPTED));
    }

    #[test]
    fn colored_output_contains_escapes() {
        let text = "print(x)";
        let result = aggregate(vec![complaint(
            "debug-print",
            Severity::Warning,
            "a.py",
            text,
            Span::new(0, 5),
        )]);
        let colored = render(&result, &ReportStyle::colored()).text;
        let plain = render(&result, &ReportStyle::plain()).text;
        assert!(colored.contains("\u{1b}["));
        assert!(!plain.contains("\u{1b}["));
        assert_eq!(console::strip_ansi_codes(&colored), plain);
    }

    #[test]
    fn exit_status_codes() {
        assert_eq!(ExitStatus::Clean.code(), 0);
        assert_eq!(ExitStatus::Critical.code(), 1);
        assert_eq!(ExitStatus::LoadFailure.code(), 2);
        assert_eq!(ExitStatus::ScanFailure.code(), 3);
    }
}
