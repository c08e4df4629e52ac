//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use crate::prompt;
use crate::search::SearchResult;
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Successful relay response
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    /// The search hits the prompt was built from
    pub search_results: Vec<SearchResult>,
    /// LLM response body, unmodified
    pub llm_response: Value,
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Endpoint statistics
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Search, then summarize.
///
/// The body is taken as raw bytes so that malformed JSON, a missing query
/// and a non-string query all get the same 400 response.
pub async fn search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    relay(&state, &body)
        .instrument(info_span!("relay", %request_id))
        .await
        .map(Json)
}

async fn relay(state: &AppState, body: &[u8]) -> Result<RelayResponse, ApiError> {
    let query = match extract_query(body) {
        Some(query) => query,
        None => {
            warn!("Rejected request without a usable query");
            return Err(ApiError::MissingQuery);
        }
    };
    state.metrics.inc_search();

    let search_results = state.search.execute(&query).await;
    if search_results.is_empty() {
        return Err(ApiError::SearchUnavailable);
    }

    if search_results.iter().all(|r| r.snippet().is_none()) {
        warn!("Selected results have no snippet text, prompting with the query alone");
    }
    let prompt = prompt::from_results(&search_results, &query);

    let llm_response = match state.llm.generate(&prompt).await {
        Ok(Value::Null) => {
            warn!("LLM returned a null body");
            state.metrics.inc_llm_failure();
            return Err(ApiError::LlmUnavailable);
        }
        Ok(body) => body,
        Err(_) => {
            state.metrics.inc_llm_failure();
            return Err(ApiError::LlmUnavailable);
        }
    };

    info!("Relayed query with {} search results", search_results.len());
    Ok(RelayResponse {
        search_results,
        llm_response,
    })
}

/// The `query` string as sent, if the body is a JSON object carrying a
/// non-blank one
fn extract_query(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("query")
        .and_then(Value::as_str)
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointConfig, Settings};
    use crate::network::HttpClient;
    use crate::web::create_router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(search_urls: &[String], llm_url: &str) -> Router {
        let mut settings = Settings::default();
        settings.search.endpoints = search_urls.iter().map(EndpointConfig::new).collect();
        settings.search.timeout = 2.0;
        settings.llm.url = llm_url.to_string();
        settings.llm.auth = Some("Bearer test".to_string());
        settings.llm.model = Some("llama3".to_string());
        settings.llm.timeout = 2.0;
        settings.validate().unwrap();

        let state = AppState::new(&settings, HttpClient::new().unwrap()).unwrap();
        create_router(state)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_search(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        call(app, request).await
    }

    fn results(contents: &[&str]) -> Value {
        let hits: Vec<Value> = contents.iter().map(|c| json!({ "content": c })).collect();
        json!({ "results": hits })
    }

    async fn search_server(body: Value, delay_ms: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&server)
            .await;
        server
    }

    async fn llm_server(expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    fn search_url(server: &MockServer) -> String {
        format!("{}/search", server.uri())
    }

    fn llm_url(server: &MockServer) -> String {
        format!("{}/api/generate", server.uri())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(&[], "http://127.0.0.1:1/api/generate");
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let searx = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "capital of France"))
            .and(query_param("format", "json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(results(&["Paris is the capital of France."])),
            )
            .expect(1)
            .mount(&searx)
            .await;

        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({
                "model": "llama3",
                "prompt": "Web snippets:\n- Paris is the capital of France.\nUser query: capital of France"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Paris." })))
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm_url(&llm));
        let (status, body) = post_search(app, r#"{"query":"capital of France"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "search_results": [{ "content": "Paris is the capital of France." }],
                "llm_response": { "response": "Paris." }
            })
        );
    }

    #[tokio::test]
    async fn test_missing_query_makes_no_outbound_calls() {
        let searx = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["x"])))
            .expect(0)
            .mount(&searx)
            .await;
        let llm = llm_server(0).await;

        for body in [
            "{}",
            r#"{"query":""}"#,
            r#"{"query":"   "}"#,
            r#"{"query":42}"#,
            r#"{"query":null}"#,
            r#"["query"]"#,
            "not json",
            "",
        ] {
            let app = app(&[search_url(&searx)], &llm_url(&llm));
            let (status, response) = post_search(app, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(
                response,
                json!({ "error": "Missing query", "code": "missing_query" })
            );
        }
    }

    #[tokio::test]
    async fn test_failing_endpoints_are_isolated() {
        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&broken)
            .await;
        let malformed = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"results\": ["))
            .mount(&malformed)
            .await;
        let good = search_server(results(&["from good"]), 0).await;
        let llm = llm_server(1).await;

        let app = app(
            &[search_url(&broken), search_url(&malformed), search_url(&good)],
            &llm_url(&llm),
        );
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search_results"], json!([{ "content": "from good" }]));
        assert_eq!(body["llm_response"], json!({ "response": "ok" }));
    }

    #[tokio::test]
    async fn test_stuck_endpoint_bounded_by_timeout() {
        let stuck = search_server(results(&["too late"]), 10_000).await;
        let good = search_server(results(&["from good"]), 0).await;
        let llm = llm_server(1).await;

        let app = app(&[search_url(&stuck), search_url(&good)], &llm_url(&llm));
        let start = Instant::now();
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search_results"], json!([{ "content": "from good" }]));
        // search timeout is 2s in these tests
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_selection_follows_configured_order() {
        let slow_first = search_server(results(&["from first"]), 300).await;
        let fast_second = search_server(results(&["from second"]), 0).await;
        let llm = llm_server(3).await;

        for _ in 0..3 {
            let app = app(
                &[search_url(&slow_first), search_url(&fast_second)],
                &llm_url(&llm),
            );
            let (status, body) = post_search(app, r#"{"query":"q"}"#).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["search_results"], json!([{ "content": "from first" }]));
        }
    }

    #[tokio::test]
    async fn test_all_endpoints_failed_skips_llm() {
        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&broken)
            .await;
        let empty = search_server(results(&[]), 0).await;
        let llm = llm_server(0).await;

        let app = app(&[search_url(&broken), search_url(&empty)], &llm_url(&llm));
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({ "error": "All SearXNG endpoints failed.", "code": "search_unavailable" })
        );
    }

    #[tokio::test]
    async fn test_no_endpoints_configured() {
        let llm = llm_server(0).await;
        let app = app(&[], &llm_url(&llm));
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "search_unavailable");
    }

    #[tokio::test]
    async fn test_only_first_three_results_forwarded() {
        let searx = search_server(results(&["one", "two", "three", "four", "five"]), 0).await;

        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "model": "llama3",
                "prompt": "Web snippets:\n- one\n- two\n- three\nUser query: q"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["search_results"],
            json!([{ "content": "one" }, { "content": "two" }, { "content": "three" }])
        );
    }

    #[tokio::test]
    async fn test_llm_failure_returns_gateway_error() {
        let searx = search_server(results(&["snippet"]), 0).await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "response": "partial output" })),
            )
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({ "error": "LLM processing failed", "code": "llm_unavailable" })
        );
    }

    #[tokio::test]
    async fn test_llm_null_body_is_failure() {
        let searx = search_server(results(&["x"]), 0).await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, body) = post_search(app.clone(), r#"{"query":"q"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            json!({ "error": "LLM processing failed", "code": "llm_unavailable" })
        );

        let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();
        let (_, stats) = call(app, request).await;
        assert_eq!(stats["llm_failures"], 1);
    }

    #[tokio::test]
    async fn test_null_fields_echoed_verbatim() {
        let hit = json!({ "content": "Paris", "title": ["a"], "url": null, "extra": 1 });
        let searx = search_server(json!({ "results": [hit.clone()] }), 0).await;
        let llm = llm_server(1).await;

        let app = app(&[search_url(&searx)], &llm_url(&llm));
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search_results"], json!([hit]));
    }

    #[tokio::test]
    async fn test_llm_timeout_returns_gateway_error() {
        let searx = search_server(results(&["snippet"]), 0).await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "late" }))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, body) = post_search(app, r#"{"query":"q"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.get("llm_response").is_none());
    }

    #[tokio::test]
    async fn test_blank_snippets_prompt_with_query_only() {
        let searx = search_server(json!({ "results": [{ "title": "t", "content": "" }] }), 0).await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "model": "llama3", "prompt": "what is rust" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, body) = post_search(app, r#"{"query":"what is rust"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["search_results"], json!([{ "title": "t", "content": "" }]));
    }

    #[tokio::test]
    async fn test_query_forwarded_as_sent() {
        let searx = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "  capital of France "))
            .respond_with(ResponseTemplate::new(200).set_body_json(results(&["Paris"])))
            .expect(1)
            .mount(&searx)
            .await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "model": "llama3",
                "prompt": "Web snippets:\n- Paris\nUser query:   capital of France "
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(1)
            .mount(&llm)
            .await;

        let app = app(&[search_url(&searx)], &llm.uri());
        let (status, _) = post_search(app, r#"{"query":"  capital of France "}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_reflect_requests() {
        let searx = search_server(results(&["snippet"]), 0).await;
        let llm = llm_server(1).await;

        let app = app(&[search_url(&searx)], &llm_url(&llm));
        let (status, _) = post_search(app.clone(), r#"{"query":"q"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();
        let (status, stats) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_searches"], 1);
        assert_eq!(stats["llm_failures"], 0);
        let endpoints = stats["endpoints"].as_object().unwrap();
        assert_eq!(endpoints.len(), 1);
        let entry = endpoints.values().next().unwrap();
        assert_eq!(entry["successes"], 1);
    }
}
