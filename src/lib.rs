//! webscout: a conversational web research agent.
//!
//! A language model answers questions by calling two tools in a loop: a
//! DuckDuckGo search and a page fetcher that serves readable page content in
//! token-bounded pages. [`agent::ChatSession`] holds the conversation and runs
//! one [`agent_loop::AgentLoop`] turn per question.
//!
//! # Quick Start
//!
//! ```no_run
//! use webscout::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> webscout::error::Result<()> {
//! let config = ScoutConfig::load()?;
//! let mut session = ChatSession::new(&config)?;
//! let outcome = session
//!     .submit("Who won the 2023 FIFA Women's World Cup?", &CancellationToken::new())
//!     .await?;
//! println!("{}", outcome.answer_text());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod search;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
