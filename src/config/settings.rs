//! Settings structures for SearX-Relay configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Placeholder substituted with the user query inside endpoint parameters
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with the process environment
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary variable source.
    ///
    /// `SEARCH_ENDPOINTS` replaces the configured endpoint list outright;
    /// `SEARXNG_API_URL` is only honoured when no endpoint is configured.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("OLLAMA_BASE_URL") {
            self.llm.url = val;
        }
        if let Some(val) = lookup("OLLAMA_AUTH") {
            self.llm.auth = Some(val).filter(|v| !v.is_empty());
        }
        if let Some(val) = lookup("MODEL") {
            self.llm.model = Some(val).filter(|v| !v.is_empty());
        }
        if let Some(val) = lookup("SEARCH_ENDPOINTS") {
            self.search.endpoints = val
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(EndpointConfig::new)
                .collect();
        }
        if self.search.endpoints.is_empty() {
            if let Some(val) = lookup("SEARXNG_API_URL").filter(|v| !v.trim().is_empty()) {
                self.search.endpoints.push(EndpointConfig::new(val.trim()));
            }
        }
        if let Some(port) = lookup("RELAY_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("RELAY_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(secs) = lookup("SEARCH_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.search.timeout = secs;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.llm.timeout = secs;
        }
    }

    /// Check the settings are usable before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.llm.url.trim().is_empty() {
            bail!("LLM endpoint is not configured (set OLLAMA_BASE_URL or llm.url)");
        }
        Url::parse(&self.llm.url).with_context(|| format!("invalid LLM url '{}'", self.llm.url))?;

        for endpoint in &self.search.endpoints {
            Url::parse(&endpoint.url)
                .with_context(|| format!("invalid search endpoint url '{}'", endpoint.url))?;
        }

        if !self.search.timeout.is_finite() || self.search.timeout <= 0.0 {
            bail!("search.timeout must be positive");
        }
        if !self.llm.timeout.is_finite() || self.llm.timeout <= 0.0 {
            bail!("llm.timeout must be positive");
        }
        if self.search.max_results == 0 {
            bail!("search.max_results must be at least 1");
        }
        Ok(())
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Search fan-out settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Ordered list of search endpoints
    pub endpoints: Vec<EndpointConfig>,
    /// Per-endpoint timeout in seconds
    pub timeout: f64,
    /// Results kept from the selected endpoint
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            timeout: 10.0,
            max_results: 3,
        }
    }
}

/// A single configured search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Display name used in logs and stats (defaults to the url host)
    pub name: Option<String>,
    /// Base URL of the search API
    pub url: String,
    /// Query parameter template; values may contain `{query}`
    pub params: HashMap<String, String>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: None,
            url: String::new(),
            params: default_params(),
            headers: HashMap::new(),
        }
    }
}

impl EndpointConfig {
    /// Endpoint with the default SearXNG parameters
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a request header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Name shown in logs: explicit name, else host[:port], else the raw url
    pub fn display_name(&self) -> String {
        if let Some(ref name) = self.name {
            return name.clone();
        }
        match Url::parse(&self.url) {
            Ok(u) => match (u.host_str(), u.port()) {
                (Some(host), Some(port)) => format!("{}:{}", host, port),
                (Some(host), None) => host.to_string(),
                _ => self.url.clone(),
            },
            Err(_) => self.url.clone(),
        }
    }

    /// Expand the parameter template for a query
    pub fn render_params(&self, query: &str) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.replace(QUERY_PLACEHOLDER, query)))
            .collect();
        params.sort();
        params
    }
}

fn default_params() -> HashMap<String, String> {
    HashMap::from([
        ("q".to_string(), QUERY_PLACEHOLDER.to_string()),
        ("format".to_string(), "json".to_string()),
    ])
}

/// Shape of the JSON body sent to the LLM backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmRequestStyle {
    /// `{"model": .., "prompt": ..}`
    #[default]
    Generate,
    /// `{"prompt": .., "max_tokens": ..}`
    Summarize,
}

/// LLM backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Full URL of the generation endpoint
    pub url: String,
    /// Value of the Authorization header, sent verbatim
    pub auth: Option<String>,
    /// Model identifier
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout: f64,
    pub request_style: LlmRequestStyle,
    /// Token cap for the summarize style
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth: None,
            model: None,
            timeout: 30.0,
            request_style: LlmRequestStyle::Generate,
            max_tokens: 300,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Fixed user agent (none = random browser UA)
    pub useragent: Option<String>,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            pool_maxsize: 20,
            verify_ssl: true,
            useragent: None,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
