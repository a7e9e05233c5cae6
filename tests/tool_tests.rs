//! Built-in tools wired through the registry, against a local server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webscout::fetch::{PageFetcher, INVALID_URL_MESSAGE};
use webscout::search::SearchClient;
use webscout::tools::{BuiltinTool, ToolRegistry};
use webscout::types::AgentToolCall;

const LITE: &str = r#"<table>
<tr><td><a class="result-link" href="https://tokio.rs/">Tokio</a></td></tr>
<tr><td class="result-snippet">An asynchronous runtime for Rust.</td></tr>
<tr class="result-sponsored"><td><a class="result-link" href="https://ads.example/">Buy now</a></td></tr>
<tr><td><a class="result-link" href="https://docs.rs/tokio">tokio - Rust</a></td></tr>
<tr><td class="result-snippet">API docs.</td></tr>
</table>"#;

fn registry(server: &MockServer) -> ToolRegistry {
    let fetcher = Arc::new(PageFetcher::new(Duration::from_secs(5)).unwrap());
    let search =
        Arc::new(SearchClient::duckduckgo(Some(server.uri()), Duration::from_secs(5)).unwrap());
    ToolRegistry::builtin(fetcher, search, "gpt-4").unwrap()
}

fn call(name: &str, arguments: serde_json::Value) -> AgentToolCall {
    AgentToolCall {
        id: "call_1".into(),
        name: name.into(),
        arguments,
    }
}

#[tokio::test]
async fn builtin_definitions_describe_both_tools() {
    let server = MockServer::start().await;
    let definitions = registry(&server).definitions();

    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["search_ddg", "fetch_page"]);

    let fetch = &definitions[1];
    assert_eq!(fetch.description, BuiltinTool::FetchPage.description());
    assert_eq!(fetch.parameters["properties"]["url"]["type"], "string");
    assert_eq!(fetch.parameters["properties"]["page"]["type"], "integer");
    assert_eq!(fetch.parameters["required"], json!(["url"]));

    let search = &definitions[0];
    assert_eq!(search.parameters["required"], json!(["query"]));
    assert_eq!(
        search.parameters["properties"]["max_result_num"]["type"],
        "integer"
    );
}

#[tokio::test]
async fn search_ddg_returns_condensed_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lite/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LITE))
        .mount(&server)
        .await;

    let result = registry(&server)
        .execute(&call("search_ddg", json!({"query": "tokio", "max_result_num": 3})))
        .await;

    assert!(!result.is_error);
    assert_eq!(result.tool_call_id, "call_1");
    assert_eq!(
        result.result,
        json!([
            {"title": "Tokio", "snippet": "An asynchronous runtime for Rust.", "url": "https://tokio.rs/"},
            {"title": "tokio - Rust", "snippet": "API docs.", "url": "https://docs.rs/tokio"},
        ])
    );
}

#[tokio::test]
async fn search_ddg_accepts_string_encoded_arguments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lite/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LITE))
        .mount(&server)
        .await;

    let result = registry(&server)
        .execute(&call(
            "search_ddg",
            json!("{\"query\": \"tokio\", \"max_result_num\": 1}"),
        ))
        .await;

    assert!(!result.is_error);
    assert_eq!(result.result.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_ddg_backend_failure_is_an_error_observation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lite/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = registry(&server)
        .execute(&call("search_ddg", json!({"query": "tokio"})))
        .await;

    assert!(result.is_error);
    let message = result.result["error"].as_str().unwrap();
    assert!(message.starts_with("tool search_ddg failed:"));
    assert!(message.contains("500"));
}

#[tokio::test]
async fn fetch_page_observation_carries_status_and_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Guide</title></head><body><main>\
             <p>Spawning tasks moves work onto the runtime's worker threads.</p>\
             </main></body></html>",
        ))
        .mount(&server)
        .await;

    let result = registry(&server)
        .execute(&call(
            "fetch_page",
            json!({"url": format!("{}/guide", server.uri()), "page": 1}),
        ))
        .await;

    assert!(!result.is_error);
    assert_eq!(result.result["status"], 200);
    assert_eq!(result.result["page_content"]["title"], "Guide");
    assert_eq!(result.result["page_content"]["has_next"], false);
}

#[tokio::test]
async fn fetch_page_bad_url_is_a_failed_fetch_not_a_tool_error() {
    let server = MockServer::start().await;
    let result = registry(&server)
        .execute(&call("fetch_page", json!({"url": "not a url"})))
        .await;

    assert!(!result.is_error);
    assert_eq!(
        result.result,
        json!({"status": 400, "page_content": {"error_message": INVALID_URL_MESSAGE}})
    );
}

#[tokio::test]
async fn fetch_page_rejects_mistyped_page() {
    let server = MockServer::start().await;
    let result = registry(&server)
        .execute(&call(
            "fetch_page",
            json!({"url": "https://example.com", "page": "two"}),
        ))
        .await;

    assert!(result.is_error);
    assert_eq!(
        result.result["error"],
        "tool fetch_page failed: invalid arguments: field 'page' expected type 'integer', got string"
    );
}
