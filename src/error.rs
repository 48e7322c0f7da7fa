// src/error.rs

use std::path::PathBuf;

use crate::schema::LogicalField;

/// Every failure the library can report. All of them are recoverable:
/// callers keep their last good `Table` and carry on.
#[derive(Debug, thiserror::Error)]
pub enum TenderError {
    /// Transport-level failure talking to the feed.
    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// The feed answered with a non-success status.
    #[error("HTTP error! status: {status} ({url})")]
    Status { url: String, status: u16 },

    /// The feed text could not be read as a header row plus data rows.
    #[error("parse error: {0}")]
    Parse(String),

    /// Sort was requested on a column outside the sortable subset.
    #[error("field `{0}` is not sortable")]
    InvalidSortField(LogicalField),

    /// A field identifier that is not part of the schema.
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TenderError>;

impl TenderError {
    /// Both transport failures and bad statuses count as fetch errors.
    pub fn is_fetch(&self) -> bool {
        matches!(self, TenderError::Fetch { .. } | TenderError::Status { .. })
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for TenderError {
    fn from(err: csv::Error) -> Self {
        TenderError::Parse(err.to_string())
    }
}
