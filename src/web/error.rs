//! Error responses returned by the relay API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every way a relay request can fail, as seen by the caller.
///
/// Caller mistakes map to 4xx; upstream trouble maps to 502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Missing query")]
    MissingQuery,

    #[error("All SearXNG endpoints failed.")]
    SearchUnavailable,

    #[error("LLM processing failed")]
    LlmUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::SearchUnavailable | ApiError::LlmUnavailable => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingQuery => "missing_query",
            ApiError::SearchUnavailable => "search_unavailable",
            ApiError::LlmUnavailable => "llm_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}
