//! Integration tests for the API layer.
//!
//! These tests spin up a real HTTP server on a random port and talk to it
//! with reqwest. Agents run in simulated mode, so no completion service is
//! needed.

use axum::{Router, routing::get as route_get};
use concierge_api::{AppState, create_router, with_middleware};
use serde_json::Value;
use std::sync::Arc;

/// Spin up a test server on a random port and return the base URL.
async fn start_test_server(state: AppState) -> String {
    serve_router(create_router(Arc::new(state))).await
}

async fn serve_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to GET a URL and return (status, json body).
async fn get(base: &str, path: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .get(format!("{}{}", base, path))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap();
    (status, body)
}

/// Helper to POST a raw body as JSON and return (status, body string).
async fn post_json(base: &str, path: &str, json: &str) -> (u16, String) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .header("content-type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, body)
}

async fn ask(base: &str, json: &str) -> (u16, Value) {
    let (status, body) = post_json(base, "/ask", json).await;
    let json = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("non-JSON body ({e}): {body}"));
    (status, json)
}

// ============================================================================
// Status and introspection
// ============================================================================

#[tokio::test]
async fn test_status_endpoint() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = get(&base, "/").await;

    assert_eq!(status, 200);
    assert_eq!(json["status"], "active");
    assert_eq!(json["openai_enabled"], false);
    assert_eq!(
        json["available_agents"],
        serde_json::json!(["greeter", "task_executor", "coordinator"])
    );
    assert!(json["endpoints"]["POST /ask"].is_string());
    assert_eq!(json["example_request"]["agent"], "coordinator");
}

#[tokio::test]
async fn test_agents_endpoint() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = get(&base, "/agents").await;

    assert_eq!(status, 200);
    assert_eq!(json["total_agents"], 3);

    let agents = &json["agents"];
    assert_eq!(agents["coordinator"]["has_sub_agents"], true);
    assert_eq!(agents["greeter"]["has_sub_agents"], false);
    assert_eq!(
        agents["task_executor"]["tools"],
        serde_json::json!(["perform_task", "get_current_time"])
    );
    assert!(
        agents["greeter"]["description"]
            .as_str()
            .unwrap()
            .contains("greeting")
    );
}

// ============================================================================
// Ask endpoint: success
// ============================================================================

#[tokio::test]
async fn test_ask_greeter() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, r#"{"agent": "greeter", "query": "hi"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(json["agent"], "greeter");
    assert_eq!(json["query"], "hi");
    assert!(json["response"].as_str().unwrap().contains("Hello! Welcome!"));
    assert_eq!(json["openai_used"], false);
    assert!(
        chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok(),
        "timestamp is not ISO-8601: {}",
        json["timestamp"]
    );
}

#[tokio::test]
async fn test_ask_defaults_to_coordinator() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, r#"{"query": "Hello there"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(json["agent"], "coordinator");
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("[Coordinator] Routing to greeter: ")
    );
}

#[tokio::test]
async fn test_ask_task_executor_time() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(
        &base,
        r#"{"agent": "task_executor", "query": "what time is it"}"#,
    )
    .await;

    assert_eq!(status, 200);
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("The current time is ")
    );
}

// ============================================================================
// Ask endpoint: client errors
// ============================================================================

#[tokio::test]
async fn test_ask_empty_object() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, "{}").await;
    assert_eq!(status, 400);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_ask_missing_body() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, "").await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "No data provided");
}

#[tokio::test]
async fn test_ask_missing_query() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, r#"{"agent": "greeter"}"#).await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "No query provided");
}

#[tokio::test]
async fn test_ask_unknown_agent() {
    let base = start_test_server(AppState::simulated()).await;
    let (status, json) = ask(&base, r#"{"agent": "unknown", "query": "hi"}"#).await;

    assert_eq!(status, 404);
    assert_eq!(json["error"], "Agent 'unknown' not found");
    assert_eq!(
        json["available_agents"],
        serde_json::json!(["greeter", "task_executor", "coordinator"])
    );
}

// ============================================================================
// Payload size limits
// ============================================================================

#[tokio::test]
async fn test_ask_payload_too_large() {
    let base = start_test_server(AppState::simulated().with_body_limit(1024)).await;
    let large_query = "x".repeat(4096);
    let (status, _body) = post_json(
        &base,
        "/ask",
        &format!(r#"{{"query": "{}"}}"#, large_query),
    )
    .await;
    assert_eq!(status, 413, "Expected 413 Payload Too Large, got {}", status);
}

// ============================================================================
// Completion service failures stay in the reply
// ============================================================================

#[tokio::test]
async fn test_unreachable_completion_service_returns_200() {
    let config = concierge_llm::LlmConfig {
        api_key: Some("sk-test".to_string()),
        api_url: Some("http://127.0.0.1:9".to_string()),
        timeout_ms: 2_000,
        ..Default::default()
    };
    let base = start_test_server(AppState::from_llm_config(&config).unwrap()).await;

    let (status, json) = ask(&base, r#"{"agent": "greeter", "query": "hi"}"#).await;

    assert_eq!(status, 200);
    assert_eq!(json["openai_used"], true);
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("OpenAI API Error: ")
    );
}

// ============================================================================
// Handler panics
// ============================================================================

async fn explode() -> &'static str {
    panic!("handler exploded")
}

#[tokio::test]
async fn test_handler_panic_returns_500_json() {
    let router = with_middleware(Router::new().route("/explode", route_get(explode)), 1024);
    let base = serve_router(router).await;

    let (status, json) = get(&base, "/explode").await;

    assert_eq!(status, 500);
    assert_eq!(json, serde_json::json!({"error": "handler exploded"}));
}
