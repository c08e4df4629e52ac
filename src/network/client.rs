//! HTTP client for calling search and LLM backends

use super::error::BackendError;
use super::user_agent::{accept_json, generate_user_agent};
use crate::config::OutgoingSettings;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{trace, warn};

/// HTTP client wrapper shared by every backend.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> anyhow::Result<Self> {
        let user_agent = settings
            .useragent
            .clone()
            .unwrap_or_else(generate_user_agent);

        let mut builder = Client::builder()
            .user_agent(user_agent.clone())
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            user_agent,
        })
    }

    /// GET `url` with query parameters and return the parsed JSON body.
    ///
    /// Headers given here replace the client defaults (including User-Agent).
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        let mut request = self
            .client
            .get(url)
            .timeout(timeout)
            .header("Accept", accept_json())
            .query(params);
        request = with_headers(request, headers);
        Self::send_json(request).await
    }

    /// POST a JSON body to `url` and return the parsed JSON response
    pub async fn post_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, BackendError> {
        let mut request = self
            .client
            .post(url)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(body);
        request = with_headers(request, headers);
        Self::send_json(request).await
    }

    async fn send_json(request: RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        trace!("backend responded with {} bytes", bytes.len());
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Configured headers replace any same-named header already on the request
fn with_headers(request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!("Skipping invalid header {:?}", key),
        }
    }
    request.headers(map)
}
