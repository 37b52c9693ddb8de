//! Merging complaints into one ordered [`ScanResult`].

use std::cmp::Ordering;

use crate::select::path_order;
use crate::types::{Complaint, ScanResult, Severity};

/// Report order: path (as `/`-separated text), first line, column, rule name.
#[must_use]
pub fn report_order(a: &Complaint, b: &Complaint) -> Ordering {
    path_order(&a.path, &b.path)
        .then(a.location.first_line.cmp(&b.location.first_line))
        .then(a.location.column.cmp(&b.location.column))
        .then_with(|| a.rule.cmp(&b.rule))
}

/// Sorts complaints into report order and counts them by severity.
///
/// The sort is stable and nothing is de-duplicated: identical complaints
/// stay distinct records.
#[must_use]
pub fn aggregate(mut complaints: Vec<Complaint>) -> ScanResult {
    complaints.sort_by(report_order);

    let warnings = complaints
        .iter()
        .filter(|c| c.severity == Severity::Warning)
        .count();
    let criticals = complaints.len() - warnings;

    ScanResult {
        total: complaints.len(),
        warnings,
        criticals,
        complaints,
        ..ScanResult::default()
    }
}
