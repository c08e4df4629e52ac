//! Search backend module
//!
//! Defines the SearchBackend trait and the SearXNG implementation built
//! from configured endpoints.

mod loader;
mod searxng;
mod traits;

pub use loader::EngineLoader;
pub use searxng::Searxng;
pub use traits::*;
