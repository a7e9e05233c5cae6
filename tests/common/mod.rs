//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use webscout::error::ScoutError;
use webscout::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use webscout::tools::{FnTool, ToolParameters, ToolRegistry};
use webscout::types::*;

/// A mock provider that replays queued responses and records every request.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<VecDeque<Result<ProviderResponse, ScoutError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Arc<Self> {
        Arc::new(Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue a final text answer.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a single tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        }));
    }

    pub fn queue_error(&self, err: ScoutError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, ScoutError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ProviderResponse {
                    text: "Mock response".to_string(),
                    ..Default::default()
                })
            })
    }
}

/// Registry with stub `search_ddg` and `fetch_page` tools that answer
/// without touching the network.
pub fn stub_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(FnTool::new(
            "search_ddg",
            "Stub search",
            ToolParameters::object()
                .string("query", "Keywords", true)
                .integer("max_result_num", "Limit", false)
                .build(),
            |args, _ctx| async move {
                let query = args.get_str("query")?.to_string();
                Ok(json!([{
                    "title": format!("Result for {query}"),
                    "snippet": "Spain won the 2023 FIFA Women's World Cup.",
                    "url": "https://example.com/wwc-2023",
                }]))
            },
        )))
        .unwrap();
    registry
        .register(Arc::new(FnTool::new(
            "fetch_page",
            "Stub fetch",
            ToolParameters::object()
                .string("url", "URL", true)
                .integer("page", "Page", false)
                .build(),
            |args, _ctx| async move {
                let url = args.get_str("url")?.to_string();
                if url.contains("broken") {
                    return Err(ScoutError::tool("fetch_page", "connection reset"));
                }
                Ok(json!({
                    "status": 200,
                    "page_content": {"title": "Page", "content": format!("Content of {url}"), "has_next": false},
                }))
            },
        )))
        .unwrap();
    registry
}
