//! Byte span → line numbers, line texts and caret underline.

use crate::types::{Location, SourceLine, Span};

/// Resolves `span` against the file content it was matched in.
///
/// Line numbers are 1-indexed. A span whose text ends with a newline is
/// attributed to the line that newline terminates. Single-line spans get a
/// caret underline aligned with the matched columns; multi-line spans carry
/// their first and last line and no caret.
#[must_use]
pub fn resolve(text: &str, span: Span) -> Location {
    let start = floor_boundary(text, span.start);
    let end = floor_boundary(text, span.end).max(start);

    let before = &text[..start];
    let first_line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    let covered = &text[start..end];
    let covered = covered.strip_suffix('\n').unwrap_or(covered);
    let last_line = first_line + covered.bytes().filter(|&b| b == b'\n').count();

    let prefix = &text[line_start..start];
    let column = prefix.chars().count() + 1;
    let first = SourceLine {
        number: first_line,
        text: line_at(text, line_start).to_string(),
    };

    if last_line == first_line {
        let width = covered.trim_end_matches('\r').chars().count().max(1);
        let indent: String = prefix
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        return Location {
            first_line,
            last_line,
            column,
            lines: vec![first],
            caret: Some(format!("{indent}{}", "^".repeat(width))),
        };
    }

    let last_start = start + covered.rfind('\n').map_or(0, |i| i + 1);
    let last = SourceLine {
        number: last_line,
        text: line_at(text, last_start).to_string(),
    };
    Location {
        first_line,
        last_line,
        column,
        lines: vec![first, last],
        caret: None,
    }
}

/// The line beginning at `line_start`, without its terminator.
fn line_at(text: &str, line_start: usize) -> &str {
    let rest = &text[line_start..];
    let line = rest.find('\n').map_or(rest, |i| &rest[..i]);
    line.strip_suffix('\r').unwrap_or(line)
}

fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_single_line_span_with_caret() {
        let text = "a = 1\n    print(x)\n";
        let loc = resolve(text, Span::new(10, 15));
        assert_eq!(loc.first_line, 2);
        assert_eq!(loc.last_line, 2);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.first_line_text(), "    print(x)");
        assert_eq!(loc.caret.as_deref(), Some("    ^^^^^"));
    }

    #[test]
    fn first_line_is_one() {
        let loc = resolve("print()", Span::new(0, 5));
        assert_eq!(loc.first_line, 1);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.caret.as_deref(), Some("^^^^^"));
    }

    #[test]
    fn multi_line_span_reports_first_and_last_line() {
        let mut text = String::new();
        for i in 1..=9 {
            text.push_str(&format!("line {i}\n"));
        }
        let start = text.len() + 2;
        text.push_str("x = call(\n    1,\n)\nafter\n");
        let end = text.find(")\nafter").unwrap() + 1;

        let loc = resolve(&text, Span::new(start, end));
        assert_eq!(loc.first_line, 10);
        assert_eq!(loc.last_line, 12);
        assert!(loc.is_multiline());
        assert!(loc.caret.is_none());
        let texts: Vec<&str> = loc.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["x = call(", ")"]);
        assert_eq!(loc.lines[1].number, 12);
    }

    #[test]
    fn span_ending_with_newline_stays_on_its_line() {
        let text = "print(x)\nnext\n";
        let loc = resolve(text, Span::new(0, 9));
        assert_eq!(loc.first_line, 1);
        assert_eq!(loc.last_line, 1);
        assert!(!loc.is_multiline());
        assert_eq!(loc.caret.as_deref(), Some("^^^^^^^^"));
    }

    #[test]
    fn span_ending_before_newline_stays_on_its_line() {
        let loc = resolve("ab\ncd", Span::new(0, 2));
        assert_eq!(loc.last_line, 1);
    }

    #[test]
    fn zero_width_span_gets_one_caret() {
        let loc = resolve("ab\ncd", Span::new(4, 4));
        assert_eq!(loc.first_line, 2);
        assert_eq!(loc.column, 2);
        assert_eq!(loc.caret.as_deref(), Some(" ^"));
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let loc = resolve("one\r\ntwo\r\n", Span::new(5, 8));
        assert_eq!(loc.first_line, 2);
        assert_eq!(loc.first_line_text(), "two");
    }

    #[test]
    fn caret_keeps_tabs_for_alignment() {
        let loc = resolve("\tx = 1", Span::new(1, 2));
        assert_eq!(loc.caret.as_deref(), Some("\t^"));
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn columns_count_characters() {
        let loc = resolve("é = print", Span::new(5, 10));
        assert_eq!(loc.column, 5);
        assert_eq!(loc.caret.as_deref(), Some("    ^^^^^"));
    }

    #[test]
    fn span_at_end_of_text() {
        let loc = resolve("abc\n", Span::new(4, 4));
        assert_eq!(loc.first_line, 2);
        assert_eq!(loc.first_line_text(), "");
    }
}
