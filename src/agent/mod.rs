//! Chat sessions: conversation state around the research loop.

pub mod conversation;
pub mod session;

pub use conversation::Conversation;
pub use session::ChatSession;
