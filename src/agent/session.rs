//! A chat session: one conversation, sequential research turns, usage tally.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::agent_loop::{AgentEventSink, AgentLoop, LoopConfig, RunOutcome};
use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::fetch::PageFetcher;
use crate::models::OpenAiModel;
use crate::provider::{self, ModelProvider};
use crate::search::SearchClient;
use crate::tools::ToolRegistry;
use crate::types::{Cost, ModelMessage, Usage};

use super::conversation::Conversation;

/// Conversation plus the loop that answers it.
///
/// Turns are strictly sequential: [`ChatSession::submit`] takes `&mut self`.
#[derive(Debug)]
pub struct ChatSession {
    model: OpenAiModel,
    agent: AgentLoop,
    conversation: Conversation,
    usage: Usage,
}

impl ChatSession {
    /// Session wired to OpenAI, DuckDuckGo and the page fetcher.
    ///
    /// Fails with [`ScoutError::Configuration`] when no API key is configured.
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let provider: Arc<dyn ModelProvider> = Arc::from(provider::create_provider(config)?);
        let fetcher = Arc::new(PageFetcher::new(config.fetch_timeout)?);
        let search = SearchClient::duckduckgo(config.search_base_url.clone(), config.search_timeout)?
            .with_region(config.search_region.clone())
            .with_safe_search(config.safe_search);
        debug!(
            backend = search.backend_name(),
            region = %config.search_region,
            safe_search = %config.safe_search,
            "search client ready"
        );
        let search = Arc::new(search);
        let registry = ToolRegistry::builtin(fetcher, search, config.model.as_str())?;
        Ok(Self::with_provider(config, provider, registry))
    }

    /// Session over an arbitrary provider and tool set.
    pub fn with_provider(
        config: &ScoutConfig,
        provider: Arc<dyn ModelProvider>,
        registry: ToolRegistry,
    ) -> Self {
        debug!(model = %config.model, tools = ?registry.names(), "chat session created");
        Self {
            model: config.model.clone(),
            agent: AgentLoop::new(provider, registry, LoopConfig::from(config)),
            conversation: Conversation::new(),
            usage: Usage::default(),
        }
    }

    /// Observe loop activity (tool calls, intermediate text).
    pub fn with_event_sink(mut self, sink: AgentEventSink) -> Self {
        self.agent = self.agent.with_event_sink(sink);
        self
    }

    /// Ask a question. The final answer is appended to the conversation.
    ///
    /// A canceled turn keeps the prompt but adds no answer. A failed turn
    /// leaves the conversation as it was before the call.
    pub async fn submit(&mut self, prompt: &str, cancel: &CancellationToken) -> Result<RunOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ScoutError::InvalidArgument("prompt is empty".into()));
        }
        self.conversation.add_user_message(prompt);

        let outcome = match self.agent.run(self.conversation.messages(), cancel).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.conversation.pop_user_message();
                return Err(err);
            }
        };

        self.usage.merge(&outcome.usage);
        if let Some(answer) = &outcome.answer {
            self.conversation.add_assistant_message(answer.clone());
        }
        info!(
            state = %outcome.state,
            iterations = outcome.iterations,
            total_tokens = self.usage.total_tokens,
            "turn complete"
        );
        Ok(outcome)
    }

    /// Reset to the greeting and zero the usage tally.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.usage = Usage::default();
    }

    pub fn messages(&self) -> &[ModelMessage] {
        self.conversation.messages()
    }

    pub fn model(&self) -> &OpenAiModel {
        &self.model
    }

    /// Tokens used since the session started or was last cleared.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Estimated spend, when the model's pricing is known.
    pub fn cost(&self) -> Option<Cost> {
        let (input, output) = self.model.pricing_per_million()?;
        Some(Cost::from_usage(&self.usage, input, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_fails_construction() {
        let config = ScoutConfig::builder().build();
        let err = ChatSession::new(&config).unwrap_err();
        assert!(matches!(err, ScoutError::Configuration(_)));
    }

    #[test]
    fn session_with_key_starts_with_greeting() {
        let config = ScoutConfig::builder().openai_api_key("sk-test").build();
        let session = ChatSession::new(&config).unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.usage(), Usage::default());
        assert_eq!(session.cost().map(|c| c.total_cost), Some(0.0));
    }
}
