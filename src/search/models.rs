//! Search result and per-endpoint outcome models

use crate::network::BackendError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single search hit as returned by a backend.
///
/// The hit is kept as the raw JSON object so it can be echoed back to the
/// caller unchanged, including `null` and non-string fields. Only `content`
/// is ever read, and only when it is a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResult(Map<String, Value>);

impl SearchResult {
    /// Result with only a content snippet
    pub fn with_content(content: impl Into<String>) -> Self {
        Self::default().field("content", content.into())
    }

    /// Set a field
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// `content` when it is a string
    pub fn content(&self) -> Option<&str> {
        self.0.get("content").and_then(Value::as_str)
    }

    /// Snippet text, if any non-blank content is present
    pub fn snippet(&self) -> Option<&str> {
        self.content().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Body shape of a SearXNG-style JSON response
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// What one endpoint produced during a fan-out
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    Success(Vec<SearchResult>),
    Failure(BackendError),
}

impl SearchOutcome {
    /// Results worth selecting: a success with at least one hit, truncated
    pub(crate) fn into_usable(self, max_results: usize) -> Option<Vec<SearchResult>> {
        match self {
            SearchOutcome::Success(mut results) if !results.is_empty() => {
                results.truncate(max_results);
                Some(results)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_unknown_fields() {
        let body = json!({
            "results": [
                {"content": "Paris is the capital of France.", "engine": "wikipedia", "score": 1.5}
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        let hit = &parsed.results[0];
        assert_eq!(hit.snippet(), Some("Paris is the capital of France."));
        assert_eq!(
            serde_json::to_value(hit).unwrap(),
            json!({"content": "Paris is the capital of France.", "engine": "wikipedia", "score": 1.5})
        );
    }

    #[test]
    fn test_missing_results_is_empty() {
        let parsed: SearchResponse = serde_json::from_value(json!({"query": "x"})).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_echo_is_verbatim() {
        let body = json!({
            "results": [
                {"content": null, "title": null, "url": ["a", "b"], "extra": 1},
                {"content": "Paris", "title": ["a"], "score": null}
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(parsed.results[0].snippet(), None);
        assert_eq!(parsed.results[1].snippet(), Some("Paris"));
        assert_eq!(serde_json::to_value(&parsed.results).unwrap(), body["results"]);
    }

    #[test]
    fn test_non_string_content_is_missing() {
        let parsed: SearchResponse =
            serde_json::from_value(json!({"results": [{"content": null}, {"content": 42}]}))
                .unwrap();
        assert!(parsed.results.iter().all(|r| r.snippet().is_none()));
    }

    #[test]
    fn test_results_must_be_objects() {
        let parsed = serde_json::from_value::<SearchResponse>(json!({"results": "nope"}));
        assert!(parsed.is_err());
        let parsed = serde_json::from_value::<SearchResponse>(json!({"results": [1, 2]}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_blank_snippet() {
        assert_eq!(SearchResult::with_content("   ").snippet(), None);
        assert_eq!(SearchResult::default().field("title", "t").snippet(), None);
    }

    #[test]
    fn test_outcome_usable() {
        let hits: Vec<_> = (0..5)
            .map(|i| SearchResult::with_content(format!("hit {}", i)))
            .collect();
        let usable = SearchOutcome::Success(hits).into_usable(3).unwrap();
        assert_eq!(usable.len(), 3);
        assert_eq!(usable[2].content(), Some("hit 2"));

        assert!(SearchOutcome::Success(vec![]).into_usable(3).is_none());
        assert!(SearchOutcome::Failure(BackendError::Timeout).into_usable(3).is_none());
    }
}
