//! Language model backend client

use crate::config::{LlmRequestStyle, LlmSettings};
use crate::network::{BackendError, HttpClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a single Ollama-style generation endpoint.
///
/// The response body is treated as opaque JSON and handed back untouched.
#[derive(Clone)]
pub struct LlmClient {
    client: HttpClient,
    url: String,
    headers: HashMap<String, String>,
    model: Option<String>,
    style: LlmRequestStyle,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings, client: HttpClient) -> Self {
        let mut headers = HashMap::new();
        if let Some(ref auth) = settings.auth {
            headers.insert("Authorization".to_string(), auth.clone());
        }

        Self {
            client,
            url: settings.url.clone(),
            headers,
            model: settings.model.clone(),
            style: settings.request_style,
            max_tokens: settings.max_tokens,
            timeout: Duration::try_from_secs_f64(settings.timeout)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// JSON body for a prompt in the configured style
    pub fn request_body(&self, prompt: &str) -> Value {
        let mut body = match self.style {
            LlmRequestStyle::Generate => json!({ "prompt": prompt }),
            LlmRequestStyle::Summarize => json!({
                "prompt": prompt,
                "max_tokens": self.max_tokens,
            }),
        };
        if let Some(ref model) = self.model {
            body["model"] = Value::String(model.clone());
        }
        body
    }

    /// Send one prompt; no retries
    pub async fn generate(&self, prompt: &str) -> Result<Value, BackendError> {
        let body = self.request_body(prompt);
        debug!("Sending {} byte prompt to LLM at {}", prompt.len(), self.url);

        let result = self
            .client
            .post_json(&self.url, &self.headers, &body, self.timeout)
            .await;

        if let Err(ref e) = result {
            warn!(kind = e.kind(), "LLM request failed: {}", e);
        }
        result
    }
}
