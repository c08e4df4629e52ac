//! SearXNG JSON API backend

use super::traits::SearchBackend;
use crate::config::EndpointConfig;
use crate::network::{BackendError, HttpClient};
use crate::search::{SearchResponse, SearchResult};
use async_trait::async_trait;
use std::time::Duration;

/// One configured SearXNG instance (or anything speaking its JSON format)
pub struct Searxng {
    name: String,
    config: EndpointConfig,
    client: HttpClient,
}

impl Searxng {
    pub fn new(config: EndpointConfig, client: HttpClient) -> Self {
        let name = config.display_name();
        Self::with_name(name, config, client)
    }

    /// Backend reported under an explicit name
    pub fn with_name(name: impl Into<String>, config: EndpointConfig, client: HttpClient) -> Self {
        Self {
            name: name.into(),
            config,
            client,
        }
    }
}

#[async_trait]
impl SearchBackend for Searxng {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Vec<SearchResult>, BackendError> {
        let params = self.config.render_params(query);
        let body = self
            .client
            .get_json(&self.config.url, &params, &self.config.headers, timeout)
            .await?;
        let response: SearchResponse = serde_json::from_value(body)?;
        Ok(response.results)
    }
}
