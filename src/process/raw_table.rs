// src/process/raw_table.rs

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Result, TenderError};

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names exactly as the feed's header row spells them.
    pub headers: Vec<String>,
    /// Each data row, positional against `headers`. Rows may be shorter or
    /// longer than the header; missing cells read as empty.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse CSV text with a header row. Ragged rows are accepted, a missing
    /// header row or an unreadable record is a `TenderError::Parse`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // the feed is not strict about field counts
            .from_reader(text.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TenderError::Parse("no header row found".into()));
        }

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result
                .map_err(|e| TenderError::Parse(format!("CSV error at record {}: {}", idx, e)))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(columns = headers.len(), rows = rows.len(), "parsed raw table");
        Ok(Self { headers, rows })
    }
}
