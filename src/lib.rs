//! Normalize the CanadaBuys open tender notice feed into a fixed schema and
//! answer search, sort and export requests over it.
//!
//! raw CSV → [`schema::HeaderMapping`] → [`process::Table`] →
//! [`query::run_query`] → [`export::export_csv`]

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod process;
pub mod query;
pub mod render;
pub mod schema;
pub mod session;

pub use error::{Result, TenderError};
