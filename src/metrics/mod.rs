//! Metrics collection module
//!
//! Tracks per-endpoint outcomes and response times. Read-only from the
//! outside; nothing here feeds back into endpoint selection.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Response time samples kept per endpoint
const MAX_SAMPLES: usize = 100;

/// Process-wide metrics collector
#[derive(Default)]
pub struct Metrics {
    total_searches: AtomicU64,
    llm_failures: AtomicU64,
    endpoints: RwLock<HashMap<String, EndpointCounters>>,
}

#[derive(Default)]
struct EndpointCounters {
    successes: u64,
    failures: u64,
    response_times: Vec<u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment LLM failure count
    pub fn inc_llm_failure(&self) {
        self.llm_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful endpoint call
    pub fn record_success(&self, endpoint: &str, time_ms: u64) {
        self.record(endpoint, time_ms, true);
    }

    /// Record a failed endpoint call
    pub fn record_error(&self, endpoint: &str, time_ms: u64) {
        self.record(endpoint, time_ms, false);
    }

    fn record(&self, endpoint: &str, time_ms: u64, ok: bool) {
        let mut endpoints = self.endpoints.write().unwrap_or_else(PoisonError::into_inner);
        let counters = endpoints.entry(endpoint.to_string()).or_default();
        if ok {
            counters.successes += 1;
        } else {
            counters.failures += 1;
        }
        if counters.response_times.len() >= MAX_SAMPLES {
            counters.response_times.remove(0);
        }
        counters.response_times.push(time_ms);
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get LLM failures
    pub fn get_llm_failures(&self) -> u64 {
        self.llm_failures.load(Ordering::Relaxed)
    }

    /// Snapshot of every endpoint seen so far
    pub fn get_endpoint_stats(&self) -> HashMap<String, EndpointStats> {
        let endpoints = self.endpoints.read().unwrap_or_else(PoisonError::into_inner);
        endpoints
            .iter()
            .map(|(name, c)| (name.clone(), c.stats()))
            .collect()
    }

    /// Full snapshot for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            llm_failures: self.get_llm_failures(),
            endpoints: self.get_endpoint_stats(),
        }
    }
}

/// Statistics for a single endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStats {
    pub searches: u64,
    pub successes: u64,
    pub failures: u64,
    pub avg_response_time_ms: Option<u64>,
    /// Success percentage; 100 when no calls were made
    pub reliability: f64,
}

impl EndpointCounters {
    fn stats(&self) -> EndpointStats {
        let searches = self.successes + self.failures;
        let avg_response_time_ms = if self.response_times.is_empty() {
            None
        } else {
            Some(self.response_times.iter().sum::<u64>() / self.response_times.len() as u64)
        };
        let reliability = if searches == 0 {
            100.0
        } else {
            (self.successes as f64 / searches as f64) * 100.0
        };
        EndpointStats {
            searches,
            successes: self.successes,
            failures: self.failures,
            avg_response_time_ms,
            reliability,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub llm_failures: u64,
    pub endpoints: HashMap<String, EndpointStats>,
}
