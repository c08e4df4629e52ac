//! Search fan-out and result selection

use super::models::{SearchOutcome, SearchResult};
use crate::engines::SearchBackend;
use crate::metrics::Metrics;
use crate::network::BackendError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Fans a query out to every configured endpoint and picks one result set.
///
/// All endpoints are queried concurrently and every call is allowed to
/// finish (or hit its own timeout) before selection. The winner is the
/// first endpoint in configured order with a non-empty result list, so the
/// choice never depends on which response happened to arrive first.
pub struct Search {
    backends: Vec<Arc<dyn SearchBackend>>,
    metrics: Arc<Metrics>,
    timeout: Duration,
    max_results: usize,
}

impl Search {
    /// Create a new search executor
    pub fn new(backends: Vec<Arc<dyn SearchBackend>>, metrics: Arc<Metrics>) -> Self {
        Self {
            backends,
            metrics,
            timeout: Duration::from_secs(10),
            max_results: 3,
        }
    }

    /// Set per-endpoint timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many results are kept from the selected endpoint
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Run the fan-out.
    ///
    /// An empty vector means no endpoint produced usable results; that is
    /// for the caller to report, not an error here.
    pub async fn execute(&self, query: &str) -> Vec<SearchResult> {
        if self.backends.is_empty() {
            warn!("No search endpoints configured");
            return Vec::new();
        }

        info!(
            "Executing search '{}' on {} endpoints",
            query,
            self.backends.len()
        );

        let outcomes = self.collect_outcomes(query).await;

        for (backend, outcome) in self.backends.iter().zip(outcomes) {
            if let Some(results) = outcome.into_usable(self.max_results) {
                info!(
                    "Selected {} results from endpoint {}",
                    results.len(),
                    backend.name()
                );
                return results;
            }
        }

        warn!("All {} search endpoints failed", self.backends.len());
        Vec::new()
    }

    /// One outcome per backend, indexed by configured position.
    ///
    /// Tasks live in a `JoinSet`, so dropping the request future aborts any
    /// calls still in flight. A task that panics or is aborted leaves its
    /// slot as a failure.
    async fn collect_outcomes(&self, query: &str) -> Vec<SearchOutcome> {
        let mut tasks = JoinSet::new();
        for (index, backend) in self.backends.iter().enumerate() {
            let backend = Arc::clone(backend);
            let metrics = Arc::clone(&self.metrics);
            let query = query.to_string();
            let limit = self.timeout;
            tasks.spawn(async move {
                let outcome = search_endpoint(backend.as_ref(), &query, limit, &metrics).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<SearchOutcome>> =
            std::iter::repeat_with(|| None).take(self.backends.len()).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Search task did not complete: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    SearchOutcome::Failure(BackendError::Network("search task aborted".to_string()))
                })
            })
            .collect()
    }
}

/// Query a single endpoint, converting every failure into an outcome
async fn search_endpoint(
    backend: &dyn SearchBackend,
    query: &str,
    limit: Duration,
    metrics: &Metrics,
) -> SearchOutcome {
    let name = backend.name();
    let start = Instant::now();

    debug!("Searching endpoint {} with timeout {:?}", name, limit);

    // The backend gets the same limit for its HTTP call; this outer bound
    // also covers backends that ignore it.
    let result = match timeout(limit, backend.search(query, limit)).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout),
    };

    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    match result {
        Ok(results) => {
            metrics.record_success(name, elapsed_ms);
            debug!(
                "Endpoint {} returned {} results in {:?}",
                name,
                results.len(),
                elapsed
            );
            SearchOutcome::Success(results)
        }
        Err(e) => {
            metrics.record_error(name, elapsed_ms);
            warn!(
                endpoint = name,
                kind = e.kind(),
                "Search endpoint failed after {:?}: {}",
                elapsed,
                e
            );
            SearchOutcome::Failure(e)
        }
    }
}
