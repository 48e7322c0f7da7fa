// src/schema/headers.rs
//
// Maps the feed's versioned column names ("title-en", "title-fr",
// "publicationDate.1") onto the fixed `LogicalField` set.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::fields::{LogicalField, FIELD_COUNT};

/// Reduce a raw header to its canonical key: cut at the first `-`, then at
/// the first `.`, then trim. Exact-string, no case folding.
pub fn normalize_header(raw: &str) -> &str {
    let head = raw.split('-').next().unwrap_or(raw);
    let head = head.split('.').next().unwrap_or(head);
    head.trim()
}

/// The raw column a logical field is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// Header text exactly as it appeared in the feed.
    pub raw: String,
    /// Position of that column in each row.
    pub index: usize,
}

/// LogicalField → source column, built once per fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: [Option<MappedColumn>; FIELD_COUNT],
}

impl HeaderMapping {
    /// Resolve the header row of a freshly parsed feed. For each normalized
    /// key only the first raw header (in column order) is retained.
    pub fn resolve(headers: &[String]) -> Self {
        let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
        for (index, raw) in headers.iter().enumerate() {
            let key = normalize_header(raw);
            if let Some(&kept) = first_seen.get(key) {
                debug!(
                    header = %raw,
                    kept = %headers[kept],
                    "duplicate normalized header ignored"
                );
                continue;
            }
            first_seen.insert(key, index);
        }

        let mut mapping = HeaderMapping::default();
        for field in LogicalField::ALL {
            match first_seen.get(field.id()) {
                Some(&index) => {
                    mapping.columns[field.index()] = Some(MappedColumn {
                        raw: headers[index].clone(),
                        index,
                    });
                }
                None => warn!(field = %field, "no source column for field; values default to empty"),
            }
        }
        mapping
    }

    pub fn get(&self, field: LogicalField) -> Option<&MappedColumn> {
        self.columns[field.index()].as_ref()
    }

    /// Raw header backing `field`, if any.
    pub fn raw_header(&self, field: LogicalField) -> Option<&str> {
        self.get(field).map(|c| c.raw.as_str())
    }

    pub fn unmapped(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn mapped_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}
