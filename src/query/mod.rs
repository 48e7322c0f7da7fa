pub mod engine;
pub mod state;

pub use engine::{matches_search, normalize_search, run_query};
pub use state::{QueryState, SortDirection, SortSpec};
