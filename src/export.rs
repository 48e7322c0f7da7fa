// src/export.rs
//
// Minimal CSV dialect for downloads: the label line is written bare, every
// data cell is wrapped in quotes with inner quotes doubled. Nothing else is
// escaped. Consumers rely on that exact shape.

use std::{fs, path::Path};
use tracing::info;

use crate::error::{Result, TenderError};
use crate::process::Record;
use crate::schema::LogicalField;

/// Label line in canonical field order.
pub fn header_line() -> String {
    LogicalField::ALL
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn record_line(record: &Record) -> String {
    record
        .iter()
        .map(|(_, value)| quote(value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize records as newline-joined CSV text, no trailing newline.
pub fn export_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut lines = vec![header_line()];
    lines.extend(records.into_iter().map(record_line));
    lines.join("\n")
}

/// Write an export to `path`, returning the number of data rows written.
pub fn write_export<'a, I>(path: impl AsRef<Path>, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let path = path.as_ref();
    let records: Vec<&Record> = records.into_iter().collect();
    let text = export_csv(records.iter().copied());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TenderError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| TenderError::io(path, e))?;
    info!(path = %path.display(), rows = records.len(), "export written");
    Ok(records.len())
}
