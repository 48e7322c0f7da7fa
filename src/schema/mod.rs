pub mod fields;
pub mod headers;

pub use fields::{LogicalField, FIELD_COUNT};
pub use headers::{normalize_header, HeaderMapping, MappedColumn};
