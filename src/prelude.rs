//! Convenience re-exports for common use.

pub use crate::agent::ChatSession;
pub use crate::agent_loop::{AgentEvent, AgentEventSink, AgentLoop, LoopConfig, LoopState, RunOutcome};
pub use crate::config::ScoutConfig;
pub use crate::error::{Result, ScoutError};
pub use crate::fetch::{PageFetchRequest, PageFetchResult, PageFetcher};
pub use crate::models::OpenAiModel;
pub use crate::provider::ModelProvider;
pub use crate::search::{SearchClient, SearchResult};
pub use crate::tools::{Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role, Usage};
