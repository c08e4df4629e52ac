//! Language model module
//!
//! Sends the assembled prompt to the configured LLM backend.

mod client;

pub use client::LlmClient;
