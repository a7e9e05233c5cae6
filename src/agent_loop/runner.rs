//! The research loop: model reasoning, tool calls, observations, answer.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;
use tracing::{debug, info, warn};

use crate::config::{ScoutConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL_TIMEOUT};
use crate::error::Result;
use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse, ToolDefinition};
use crate::tools::{BuiltinTool, ToolRegistry};
use crate::types::{AgentToolResult, GenerationSettings, ModelMessage, Role};
use crate::util::timeout::with_timeout;

use super::events::{AgentEvent, AgentEventSink, EventEmitter};
use super::prompt::{FINAL_ANSWER_NOTE, SEARCH_FIRST_NOTE, SYSTEM_PROMPT, UNABLE_TO_COMPLETE};
use super::types::{AgentRunState, LoopState, RunOutcome};

/// Loop limits and model settings.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Tool rounds allowed before the loop asks for a best-effort answer.
    pub max_iterations: usize,
    pub model_timeout: Duration,
    pub settings: GenerationSettings,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            settings: GenerationSettings::builder().temperature(0.0).build(),
        }
    }
}

impl From<&ScoutConfig> for LoopConfig {
    fn from(config: &ScoutConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            model_timeout: config.model_timeout,
            settings: GenerationSettings::builder()
                .temperature(config.temperature)
                .build(),
        }
    }
}

/// Drives one user turn at a time against a provider and a tool registry.
pub struct AgentLoop {
    provider: Arc<dyn ModelProvider>,
    registry: ToolRegistry,
    config: LoopConfig,
    system_prompt: String,
    event_sink: Option<AgentEventSink>,
}

impl std::fmt::Debug for AgentLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoop")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn ModelProvider>, registry: ToolRegistry, config: LoopConfig) -> Self {
        Self {
            provider,
            registry,
            config,
            system_prompt: SYSTEM_PROMPT.to_string(),
            event_sink: None,
        }
    }

    pub fn with_event_sink(mut self, sink: AgentEventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one turn over `history` (the conversation so far, ending with the
    /// user's message). System messages in `history` are replaced by the loop's
    /// own system prompt.
    ///
    /// A text answer is only accepted once a research tool has run this turn:
    /// `search_ddg`, or `fetch_page` when the user's message names a URL. An
    /// earlier answer is discarded and the model is asked to search; that
    /// extra request counts as a round. Registries without `search_ddg` skip
    /// the check.
    ///
    /// Tool failures are fed back to the model. Provider failures end the turn
    /// with an error.
    pub async fn run(&self, history: &[ModelMessage], cancel: &CancellationToken) -> Result<RunOutcome> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ModelMessage::system(self.system_prompt.clone()));
        messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());

        let mut state = AgentRunState::new(messages);
        let emitter = EventEmitter::new(self.event_sink.clone());
        emitter.emit(AgentEvent::RunStart { run_id: state.run_id });
        info!(
            run_id = %state.run_id,
            model = self.provider.model_id(),
            max_iterations = self.config.max_iterations,
            "research turn started"
        );

        let definitions = self.registry.definitions();
        let tools = (!definitions.is_empty()).then_some(definitions);
        let research_required = self.registry.get(BuiltinTool::SearchDdg.name()).is_some();
        let names_url = last_user_names_url(&state.history);
        let mut researched = false;
        let mut note: Option<&str> = None;

        loop {
            if state.iteration_count >= self.config.max_iterations {
                return self.finish_over_budget(state, &emitter, cancel).await;
            }
            if cancel.is_cancelled() {
                return Ok(self.cancel(state, &emitter));
            }

            emitter.emit(AgentEvent::TurnStart {
                run_id: state.run_id,
                iteration: state.iteration_count,
            });
            let mut messages = state.history.clone();
            if let Some(note) = note.take() {
                messages.push(ModelMessage::user(note));
            }
            let response = match self.call_model(messages, tools.clone(), cancel).await {
                Ok(Some(response)) => response,
                Ok(None) => return Ok(self.cancel(state, &emitter)),
                Err(err) => {
                    warn!(run_id = %state.run_id, error = %err, "model request failed");
                    emitter.emit(AgentEvent::RunFailed {
                        run_id: state.run_id,
                        error: err.to_string(),
                    });
                    return Err(err);
                }
            };
            state.usage.merge(&response.usage);

            if response.tool_calls.is_empty() && research_required && !researched {
                info!(
                    run_id = %state.run_id,
                    iteration = state.iteration_count,
                    "answer arrived before any research, asking for a search"
                );
                state.iteration_count += 1;
                note = Some(SEARCH_FIRST_NOTE);
                continue;
            }

            if !response.text.is_empty() {
                emitter.emit(AgentEvent::AssistantText {
                    run_id: state.run_id,
                    text: response.text.clone(),
                });
            }

            if response.tool_calls.is_empty() {
                state.push(ModelMessage::assistant(response.text.clone()));
                state.transition(LoopState::Done);
                return Ok(self.finish(state, Some(response.text), &emitter));
            }

            state.transition(LoopState::ToolExecuting);
            let calls = response.tool_calls.clone();
            state.push(ModelMessage::assistant_tool_calls(response.text, response.tool_calls));

            for (idx, call) in calls.iter().enumerate() {
                if cancel.is_cancelled() {
                    // Every call needs a result before the history can be replayed.
                    for skipped in &calls[idx..] {
                        state.push(ModelMessage::tool_result(
                            skipped.id.clone(),
                            serde_json::json!({ "error": format!("tool {} failed: canceled", skipped.name) }),
                            true,
                        ));
                    }
                    return Ok(self.cancel(state, &emitter));
                }

                emitter.emit(AgentEvent::ToolExecutionStart {
                    run_id: state.run_id,
                    call: call.clone(),
                });
                let result: AgentToolResult = self.registry.execute(call).await;
                researched |= is_research_call(&call.name, names_url);
                debug!(
                    run_id = %state.run_id,
                    tool = %call.name,
                    is_error = result.is_error,
                    iteration = state.iteration_count,
                    "tool call finished"
                );
                emitter.emit(AgentEvent::ToolExecutionEnd {
                    run_id: state.run_id,
                    tool_name: call.name.clone(),
                    result: result.clone(),
                });
                state.push(ModelMessage::tool_result(
                    result.tool_call_id,
                    result.result,
                    result.is_error,
                ));
            }

            state.iteration_count += 1;
            state.transition(LoopState::Reasoning);
        }
    }

    /// One model request, bounded by the model timeout. `None` when canceled.
    async fn call_model(
        &self,
        messages: Vec<ModelMessage>,
        tools: Option<Vec<ToolDefinition>>,
        cancel: &CancellationToken,
    ) -> Result<Option<ProviderResponse>> {
        let request = ProviderRequest {
            messages,
            settings: self.config.settings.clone(),
            tools,
        };
        tokio::select! {
            _ = cancel.cancelled() => Ok(None),
            response = with_timeout(self.config.model_timeout, self.provider.generate_text(&request)) => {
                response.map(Some)
            }
        }
    }

    /// Tool budget spent: ask once more, without tools, for a best-effort answer.
    async fn finish_over_budget(
        &self,
        mut state: AgentRunState,
        emitter: &EventEmitter,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        if cancel.is_cancelled() {
            return Ok(self.cancel(state, emitter));
        }
        warn!(
            run_id = %state.run_id,
            iterations = state.iteration_count,
            "iteration cap reached, requesting final answer"
        );

        let mut messages = state.history.clone();
        messages.push(ModelMessage::user(FINAL_ANSWER_NOTE));
        emitter.emit(AgentEvent::TurnStart {
            run_id: state.run_id,
            iteration: state.iteration_count,
        });
        let response = match self.call_model(messages, None, cancel).await {
            Ok(Some(response)) => response,
            Ok(None) => return Ok(self.cancel(state, emitter)),
            Err(err) => {
                emitter.emit(AgentEvent::RunFailed {
                    run_id: state.run_id,
                    error: err.to_string(),
                });
                return Err(err);
            }
        };
        state.usage.merge(&response.usage);

        let text = response.text.trim();
        let answer = if text.is_empty() {
            UNABLE_TO_COMPLETE.to_string()
        } else {
            text.to_string()
        };
        emitter.emit(AgentEvent::AssistantText {
            run_id: state.run_id,
            text: answer.clone(),
        });
        state.push(ModelMessage::assistant(answer.clone()));
        state.transition(LoopState::Aborted);
        Ok(self.finish(state, Some(answer), emitter))
    }

    fn cancel(&self, mut state: AgentRunState, emitter: &EventEmitter) -> RunOutcome {
        info!(run_id = %state.run_id, iterations = state.iteration_count, "research turn canceled");
        state.transition(LoopState::Canceled);
        self.finish(state, None, emitter)
    }

    fn finish(&self, state: AgentRunState, answer: Option<String>, emitter: &EventEmitter) -> RunOutcome {
        emitter.emit(AgentEvent::RunEnd {
            run_id: state.run_id,
            state: state.state,
            iterations: state.iteration_count,
        });
        info!(
            run_id = %state.run_id,
            state = %state.state,
            iterations = state.iteration_count,
            input_tokens = state.usage.input_tokens,
            output_tokens = state.usage.output_tokens,
            "research turn finished"
        );
        state.finish(answer)
    }
}

/// Whether a dispatched call counts as research for this turn.
fn is_research_call(tool_name: &str, user_named_url: bool) -> bool {
    match tool_name.parse::<BuiltinTool>() {
        Ok(BuiltinTool::SearchDdg) => true,
        Ok(BuiltinTool::FetchPage) => user_named_url,
        Err(_) => false,
    }
}

/// Whether the latest user message contains an http(s) URL.
fn last_user_names_url(history: &[ModelMessage]) -> bool {
    let Some(message) = history.iter().rev().find(|m| m.role == Role::User) else {
        return false;
    };
    message.text().split_whitespace().any(|word| {
        let word = word.trim_matches(|c: char| matches!(c, '(' | ')' | '<' | '>' | '"' | '\'' | ',' | '.' | '!' | '?'));
        Url::parse(word).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_urls_in_the_latest_user_message() {
        let history = vec![
            ModelMessage::user("see https://old.example/a"),
            ModelMessage::assistant("ok"),
            ModelMessage::user("Summarize (https://example.com/post?id=3)."),
        ];
        assert!(last_user_names_url(&history));

        let history = vec![
            ModelMessage::user("see https://old.example/a"),
            ModelMessage::assistant("ok"),
            ModelMessage::user("and what about ftp://files.example or example.com?"),
        ];
        assert!(!last_user_names_url(&history));
    }

    #[test]
    fn fetch_counts_as_research_only_for_named_pages() {
        assert!(is_research_call("search_ddg", false));
        assert!(is_research_call("fetch_page", true));
        assert!(!is_research_call("fetch_page", false));
        assert!(!is_research_call("open_browser", true));
    }
}
