//! Core run types for the agent loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::{ModelMessage, Usage};

/// Unique run identifier.
pub type RunId = Uuid;

/// Loop state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    Reasoning,
    ToolExecuting,
    /// Model produced a final answer.
    Done,
    /// Iteration cap reached.
    Aborted,
    /// Stopped by the caller's cancellation token.
    Canceled,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Canceled)
    }
}

/// Mutable state of one user turn, owned by the loop.
#[derive(Debug, Clone)]
pub struct AgentRunState {
    pub run_id: RunId,
    /// System prompt, prior conversation, and everything appended this turn.
    pub history: Vec<ModelMessage>,
    /// Completed tool rounds.
    pub iteration_count: usize,
    pub state: LoopState,
    pub usage: Usage,
    /// Index in `history` where this turn's messages start.
    turn_start: usize,
}

impl AgentRunState {
    pub fn new(history: Vec<ModelMessage>) -> Self {
        let turn_start = history.len();
        Self {
            run_id: Uuid::new_v4(),
            history,
            iteration_count: 0,
            state: LoopState::Reasoning,
            usage: Usage::default(),
            turn_start,
        }
    }

    pub(crate) fn transition(&mut self, next: LoopState) {
        debug!(run_id = %self.run_id, from = %self.state, to = %next, iteration = self.iteration_count, "loop state");
        self.state = next;
    }

    pub fn push(&mut self, message: ModelMessage) {
        self.history.push(message);
    }

    /// Messages appended during this turn.
    pub fn turn_messages(&self) -> &[ModelMessage] {
        &self.history[self.turn_start..]
    }

    pub(crate) fn finish(self, answer: Option<String>) -> RunOutcome {
        RunOutcome {
            run_id: self.run_id,
            state: self.state,
            answer,
            messages: self.turn_messages().to_vec(),
            iterations: self.iteration_count,
            usage: self.usage,
            finished_at: Utc::now(),
        }
    }
}

/// Result of one user turn.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    /// `Done`, `Aborted` or `Canceled`.
    pub state: LoopState,
    /// Final (or best-effort) answer. `None` only when canceled.
    pub answer: Option<String>,
    /// Messages produced this turn, tool traffic included.
    pub messages: Vec<ModelMessage>,
    pub iterations: usize,
    pub usage: Usage,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn answer_text(&self) -> &str {
        self.answer.as_deref().unwrap_or_default()
    }

    pub fn is_done(&self) -> bool {
        self.state == LoopState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!LoopState::Reasoning.is_terminal());
        assert!(!LoopState::ToolExecuting.is_terminal());
        assert!(LoopState::Done.is_terminal());
        assert!(LoopState::Aborted.is_terminal());
        assert!(LoopState::Canceled.is_terminal());
        assert_eq!(LoopState::ToolExecuting.to_string(), "tool_executing");
    }

    #[test]
    fn outcome_carries_only_turn_messages() {
        let mut state = AgentRunState::new(vec![
            ModelMessage::system("sys"),
            ModelMessage::user("question"),
        ]);
        state.push(ModelMessage::assistant("answer"));
        state.transition(LoopState::Done);

        let outcome = state.finish(Some("answer".into()));

        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].text(), "answer");
        assert!(outcome.is_done());
        assert_eq!(outcome.answer_text(), "answer");
    }
}
