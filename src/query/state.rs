// src/query/state.rs

use serde::Serialize;

use crate::error::{Result, TenderError};
use crate::schema::LogicalField;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// A validated sort request: the field is always in `LogicalField::SORTABLE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    field: LogicalField,
    direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: LogicalField, direction: SortDirection) -> Result<Self> {
        if !field.is_sortable() {
            return Err(TenderError::InvalidSortField(field));
        }
        Ok(Self { field, direction })
    }

    pub fn field(&self) -> LogicalField {
        self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Search text plus optional sort, owned by whoever drives the session.
/// Independent of any `Table`; survives refreshes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryState {
    search: String,
    sort: Option<SortSpec>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Column-header click semantics: same field flips direction, a new
    /// field starts ascending. A non-sortable field leaves the state as is.
    pub fn toggle_sort(&mut self, field: LogicalField) -> Result<SortSpec> {
        let direction = match self.sort {
            Some(current) if current.field == field => current.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        let spec = SortSpec::new(field, direction)?;
        self.sort = Some(spec);
        Ok(spec)
    }
}
