//! HTTP networking module
//!
//! Provides the single outbound HTTP call used for both search endpoints
//! and the LLM backend, with typed failures.

mod client;
mod error;
mod user_agent;

pub use client::HttpClient;
pub use error::BackendError;
pub use user_agent::generate_user_agent;
