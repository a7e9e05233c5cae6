//! Run events for observers (CLI rendering, logging, tests).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{AgentToolCall, AgentToolResult};

use super::types::{LoopState, RunId};

/// Something the loop did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    RunStart {
        run_id: RunId,
    },
    /// A model request is about to be made. `iteration` counts completed tool rounds.
    TurnStart {
        run_id: RunId,
        iteration: usize,
    },
    AssistantText {
        run_id: RunId,
        text: String,
    },
    ToolExecutionStart {
        run_id: RunId,
        call: AgentToolCall,
    },
    ToolExecutionEnd {
        run_id: RunId,
        tool_name: String,
        result: AgentToolResult,
    },
    RunEnd {
        run_id: RunId,
        state: LoopState,
        iterations: usize,
    },
    /// The model provider failed; the turn ends with an error.
    RunFailed {
        run_id: RunId,
        error: String,
    },
}

/// Callback receiving run events.
pub type AgentEventSink = Arc<dyn Fn(AgentEvent) + Send + Sync>;

/// Forwards events to an optional sink.
#[derive(Clone, Default)]
pub(crate) struct EventEmitter {
    sink: Option<AgentEventSink>,
}

impl EventEmitter {
    pub(crate) fn new(sink: Option<AgentEventSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.sink {
            sink(event);
        }
    }
}
