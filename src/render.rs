// src/render.rs
//
// Plain-text presentation used by the CLI. Nothing here feeds back into
// the table or the export.

use std::fmt::Write;

use crate::process::Record;
use crate::query::{normalize_search, QueryState, SortDirection};
use crate::schema::LogicalField;

/// Links in an attachment cell: comma separated, only tokens starting with
/// `http` are kept.
pub fn attachment_urls(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| s.starts_with("http"))
        .collect()
}

pub fn email_link(value: &str) -> Option<String> {
    value.contains('@').then(|| format!("mailto:{}", value))
}

pub const HIGHLIGHT_OPEN: &str = "[";
pub const HIGHLIGHT_CLOSE: &str = "]";

/// Byte length of the prefix of `hay` whose lowercase form equals `needle`.
/// Lowercasing is done per char so the length is measured on the original.
fn match_len_at(hay: &str, needle: &str) -> Option<usize> {
    let mut lowered = String::with_capacity(needle.len());
    for (i, ch) in hay.char_indices() {
        lowered.extend(ch.to_lowercase());
        if lowered.len() >= needle.len() {
            return (lowered == needle).then_some(i + ch.len_utf8());
        }
        if !needle.starts_with(lowered.as_str()) {
            return None;
        }
    }
    None
}

/// Wrap every non-overlapping, case-insensitive occurrence of `needle`
/// (already normalized) in highlight markers, keeping the original text.
pub fn highlight_matches(value: &str, needle: &str) -> String {
    if needle.is_empty() {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut pos = 0;
    while let Some(ch) = value[pos..].chars().next() {
        match match_len_at(&value[pos..], needle) {
            Some(len) => {
                out.push_str(HIGHLIGHT_OPEN);
                out.push_str(&value[pos..pos + len]);
                out.push_str(HIGHLIGHT_CLOSE);
                pos += len;
            }
            None => {
                out.push(ch);
                pos += ch.len_utf8();
            }
        }
    }
    out
}

/// Arrow shown next to the active sort column's label.
pub fn sort_indicator(query: &QueryState, field: LogicalField) -> &'static str {
    match query.sort() {
        Some(spec) if spec.field() == field => match spec.direction() {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => "",
    }
}

/// Status line describing the active sort and search.
pub fn describe_query(query: &QueryState) -> String {
    let sort = match query.sort() {
        Some(spec) => format!("sorted by {} ({})", spec.field(), spec.direction().as_str()),
        None => "unsorted".to_string(),
    };
    match normalize_search(query.search()) {
        s if s.is_empty() => sort,
        s => format!("{}, search {:?}", sort, s),
    }
}

/// One block per record, labels in canonical order, empty fields skipped.
pub fn render_view(view: &[&Record], query: &QueryState) -> String {
    let needle = normalize_search(query.search());
    let mut out = String::new();
    for (i, record) in view.iter().enumerate() {
        let _ = writeln!(out, "#{}", i + 1);
        for (field, value) in record.iter() {
            if value.is_empty() {
                continue;
            }
            let label = format!("{}{}", field.label(), sort_indicator(query, field));
            match field {
                LogicalField::Attachment => {
                    for url in attachment_urls(value) {
                        let _ = writeln!(out, "  {:<22} {}", label, url);
                    }
                }
                LogicalField::ContactInfoEmail => {
                    let shown = highlight_matches(value, &needle);
                    match email_link(value) {
                        Some(link) => {
                            let _ = writeln!(out, "  {:<22} {} <{}>", label, shown, link);
                        }
                        None => {
                            let _ = writeln!(out, "  {:<22} {}", label, shown);
                        }
                    }
                }
                _ => {
                    let shown = highlight_matches(value, &needle);
                    let _ = writeln!(out, "  {:<22} {}", label, shown);
                }
            }
        }
    }
    out
}
