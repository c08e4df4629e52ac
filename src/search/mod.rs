//! Search orchestration module
//!
//! Fans a query out to all configured endpoints concurrently and selects
//! one result set deterministically.

mod executor;
mod models;

pub use executor::Search;
pub use models::{SearchResponse, SearchResult};
