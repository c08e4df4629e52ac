//! Backend loader for initializing search endpoints from configuration

use super::searxng::Searxng;
use super::traits::SearchBackend;
use crate::config::{EndpointConfig, Settings};
use crate::network::HttpClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for building the ordered backend list from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Build one backend per configured endpoint, preserving configured order
    pub fn load(settings: &Settings, client: &HttpClient) -> Vec<Arc<dyn SearchBackend>> {
        let endpoints = &settings.search.endpoints;
        let backends: Vec<Arc<dyn SearchBackend>> = endpoints
            .iter()
            .zip(unique_names(endpoints))
            .map(|(config, name)| {
                let backend = Searxng::with_name(name, config.clone(), client.clone());
                info!("Loaded search endpoint: {} ({})", backend.name(), config.url);
                Arc::new(backend) as Arc<dyn SearchBackend>
            })
            .collect();

        if backends.is_empty() {
            warn!("No search endpoints configured; every search will fail");
        }
        backends
    }
}

/// Stats are keyed by name, so endpoints sharing a display name fall back
/// to their full url, and identical urls get a position suffix.
fn unique_names(endpoints: &[EndpointConfig]) -> Vec<String> {
    let count = |names: &[String], name: &str| names.iter().filter(|n| *n == name).count();

    let short: Vec<String> = endpoints.iter().map(EndpointConfig::display_name).collect();
    let named: Vec<String> = endpoints
        .iter()
        .zip(&short)
        .map(|(config, name)| {
            if config.name.is_none() && count(&short, name) > 1 {
                config.url.clone()
            } else {
                name.clone()
            }
        })
        .collect();

    let mut seen: HashMap<&str, usize> = HashMap::new();
    named
        .iter()
        .map(|name| {
            let n = seen.entry(name.as_str()).or_insert(0);
            *n += 1;
            if count(&named, name) > 1 {
                format!("{}#{}", name, n)
            } else {
                name.clone()
            }
        })
        .collect()
}
