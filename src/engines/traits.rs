//! Search backend trait

use crate::network::BackendError;
use crate::search::SearchResult;
use async_trait::async_trait;
use std::time::Duration;

/// A search backend that can be queried during a fan-out.
///
/// Implementations make exactly one attempt per call; retry and fallback
/// are the coordinator's business.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Name used in logs and stats
    fn name(&self) -> &str;

    /// Run one search, returning hits in the backend's own order
    async fn search(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Vec<SearchResult>, BackendError>;
}
