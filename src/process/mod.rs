// src/process/mod.rs
pub mod project;
pub mod raw_table;

pub use project::{project_row, Record};
pub use raw_table::RawTable;

use tracing::{info, instrument};

use crate::error::Result;
use crate::schema::HeaderMapping;

/// The full, ordered record set from one fetch. Replaced wholesale on
/// refresh, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    mapping: HeaderMapping,
}

impl Table {
    /// Parse feed text and project every row. Either the whole table is
    /// built or an error is returned.
    #[instrument(level = "info", skip(text), fields(bytes = text.len()))]
    pub fn from_csv(text: &str) -> Result<Self> {
        let raw = RawTable::parse(text)?;
        let table = Self::from_raw(&raw);
        info!(
            rows = table.len(),
            mapped = table.mapping.mapped_count(),
            "table built"
        );
        Ok(table)
    }

    pub fn from_raw(raw: &RawTable) -> Self {
        let mapping = HeaderMapping::resolve(&raw.headers);
        let records = raw
            .rows
            .iter()
            .map(|row| project_row(row, &mapping))
            .collect();
        Self { records, mapping }
    }

    /// Wrap records that were assembled elsewhere (no header mapping).
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            mapping: HeaderMapping::default(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
