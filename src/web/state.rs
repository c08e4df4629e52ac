//! Application state shared across handlers

use crate::config::Settings;
use crate::engines::EngineLoader;
use crate::llm::LlmClient;
use crate::metrics::Metrics;
use crate::network::HttpClient;
use crate::search::Search;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
///
/// Everything here is read-only after startup apart from the metrics
/// counters. Settings are consumed at construction and not kept.
#[derive(Clone)]
pub struct AppState {
    /// Search fan-out executor
    pub search: Arc<Search>,
    /// LLM backend client
    pub llm: Arc<LlmClient>,
    /// Endpoint metrics
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Build the state from validated settings
    pub fn new(settings: &Settings, client: HttpClient) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let backends = EngineLoader::load(settings, &client);
        let search = Search::new(backends, metrics.clone())
            .with_timeout(Duration::try_from_secs_f64(settings.search.timeout)?)
            .with_max_results(settings.search.max_results);
        let llm = LlmClient::new(&settings.llm, client);

        Ok(Self::from_parts(search, llm, metrics))
    }

    /// Assemble state from pre-built components
    pub fn from_parts(search: Search, llm: LlmClient, metrics: Arc<Metrics>) -> Self {
        Self {
            search: Arc::new(search),
            llm: Arc::new(llm),
            metrics,
        }
    }
}
