//! Model provider trait and the OpenAI implementation.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::ScoutConfig;
use crate::error::ScoutError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a single assistant turn: either text or tool calls.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ScoutError>;
}

/// Create the provider for the configured model.
///
/// Fails with [`ScoutError::Configuration`] when no API key is set, before any
/// network traffic happens.
pub fn create_provider(config: &ScoutConfig) -> Result<Box<dyn ModelProvider>, ScoutError> {
    let api_key = config.require_api_key()?.to_string();
    Ok(Box::new(openai::OpenAiProvider::new(
        config.model.clone(),
        api_key,
        config.openai_base_url.clone(),
        config.model_timeout,
    )?))
}
