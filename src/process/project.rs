// src/process/project.rs

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::schema::{HeaderMapping, LogicalField, FIELD_COUNT};

/// One normalized tender row. Always holds exactly one value per
/// `LogicalField`; absent values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; FIELD_COUNT],
}

impl Record {
    pub fn get(&self, field: LogicalField) -> &str {
        &self.values[field.index()]
    }

    /// Values in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &str)> + '_ {
        LogicalField::ALL
            .into_iter()
            .map(move |f| (f, self.values[f.index()].as_str()))
    }

    /// Builder-style setter, used when assembling records by hand.
    pub fn with(mut self, field: LogicalField, value: impl Into<String>) -> Self {
        self.values[field.index()] = value.into();
        self
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.id(), value)?;
        }
        map.end()
    }
}

/// Build a `Record` from one positional raw row. A field takes its mapped
/// cell when that cell exists and is non-empty, otherwise "".
pub fn project_row(row: &[String], mapping: &HeaderMapping) -> Record {
    let values = std::array::from_fn(|i| {
        let field = LogicalField::ALL[i];
        mapping
            .get(field)
            .and_then(|col| row.get(col.index))
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_default()
    });
    Record { values }
}
