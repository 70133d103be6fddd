//! Caller-side preparation of a batch: status filter and priority sort.
//!
//! The engine processes cases in whatever order it is handed. This module
//! is what a presentation layer uses to build that order.

use crate::case::CaseRow;
use std::cmp::Ordering;

/// Pseudo-status that keeps every row.
pub const ALL_STATUSES: &str = "All";

/// Status selected when the caller does not choose one.
pub const DEFAULT_STATUS: &str = "YES";

/// Distinct non-empty status values in first-seen order, plus `All`.
pub fn status_options(rows: &[CaseRow]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for status in rows.iter().filter_map(|r| r.still_pending.as_deref()) {
        if !status.is_empty() && !options.iter().any(|o| o == status) {
            options.push(status.to_string());
        }
    }
    options.push(ALL_STATUSES.to_string());
    options
}

/// Keep rows whose status is selected, then stable-sort by priority
/// descending. Rows without a priority go last, keeping their order.
pub fn pending_cases<S: AsRef<str>>(rows: &[CaseRow], statuses: &[S]) -> Vec<CaseRow> {
    let keep_all = statuses.iter().any(|s| s.as_ref() == ALL_STATUSES);
    let mut kept: Vec<CaseRow> = rows
        .iter()
        .filter(|r| {
            keep_all
                || r.still_pending
                    .as_deref()
                    .is_some_and(|p| statuses.iter().any(|s| s.as_ref() == p))
        })
        .cloned()
        .collect();
    kept.sort_by(|a, b| by_priority_desc(a.priority, b.priority));
    kept
}

fn by_priority_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
