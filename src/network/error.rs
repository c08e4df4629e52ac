//! Failure taxonomy for outbound backend calls

use thiserror::Error;

/// Why a single backend call failed.
///
/// A non-2xx status is a failure like any other; callers never see a
/// partially successful response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

impl BackendError {
    /// Stable tag used in logs and stats
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Network(_) => "network_error",
            BackendError::Timeout => "timeout",
            BackendError::HttpStatus(_) => "http_status_error",
            BackendError::InvalidJson(_) => "invalid_json",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if let Some(status) = err.status() {
            BackendError::HttpStatus(status.as_u16())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::InvalidJson(err.to_string())
    }
}
