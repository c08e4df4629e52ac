//! SearX-Relay: search-then-summarize relay
//!
//! Fans a user query out to one or more SearXNG endpoints, keeps the first
//! usable result set in configured order, builds a prompt from its snippets
//! and returns the language model's answer alongside the results used.

pub mod config;
pub mod engines;
pub mod llm;
pub mod metrics;
pub mod network;
pub mod prompt;
pub mod search;
pub mod web;

pub use config::Settings;
pub use engines::SearchBackend;
pub use search::{Search, SearchResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
