// src/query/engine.rs

use std::cmp::Ordering;
use tracing::debug;

use super::state::{QueryState, SortDirection};
use crate::process::{Record, Table};
use crate::schema::LogicalField;

/// Sort, then filter. The result borrows from `table` and keeps the order
/// established by the sort step.
pub fn run_query<'a>(table: &'a Table, query: &QueryState) -> Vec<&'a Record> {
    let mut view: Vec<&Record> = table.records().iter().collect();

    if let Some(spec) = query.sort() {
        let field = spec.field();
        // `sort_by` is stable: equal keys keep their table order in both directions
        match spec.direction() {
            SortDirection::Ascending => view.sort_by(|a, b| compare(a, b, field)),
            SortDirection::Descending => view.sort_by(|a, b| compare(b, a, field)),
        }
    }

    let needle = normalize_search(query.search());
    if !needle.is_empty() {
        view.retain(|record| matches_search(record, &needle));
    }

    debug!(
        total = table.len(),
        shown = view.len(),
        sort = ?query.sort(),
        "query evaluated"
    );
    view
}

fn compare(a: &Record, b: &Record, field: LogicalField) -> Ordering {
    // scalar-value order; differs from UTF-16 unit order only for astral vs U+E000..U+FFFF
    a.get(field).cmp(b.get(field))
}

/// Trimmed, Unicode-lowercased search text.
pub fn normalize_search(search: &str) -> String {
    search.trim().to_lowercase()
}

/// True when any field contains `needle` (already normalized), ignoring case.
pub fn matches_search(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .iter()
        .any(|(_, value)| value.to_lowercase().contains(needle))
}
