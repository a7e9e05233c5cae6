//! Agent loop primitives (runs, events, prompts).

pub mod events;
pub mod prompt;
pub mod runner;
pub mod types;

pub use events::{AgentEvent, AgentEventSink};
pub use prompt::{GREETING, SYSTEM_PROMPT};
pub use runner::{AgentLoop, LoopConfig};
pub use types::{AgentRunState, LoopState, RunId, RunOutcome};
