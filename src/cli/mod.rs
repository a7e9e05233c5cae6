//! Command-line interface for the `webscout` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::ScoutConfig;
use crate::models::OpenAiModel;
use crate::search::SafeSearch;

/// Research assistant that searches the web and reads pages to answer questions.
#[derive(Parser, Debug)]
#[command(name = "webscout", version, about = "Web research assistant")]
pub struct Cli {
    /// Model id (gpt-4, gpt-3.5-turbo-16k, gpt-3.5-turbo, or any chat model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Tool rounds per question before asking for a best-effort answer
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Page fetch timeout in seconds
    #[arg(long)]
    pub fetch_timeout: Option<u64>,

    /// DuckDuckGo region code (wt-wt for worldwide, us-en, jp-jp, ...)
    #[arg(long)]
    pub region: Option<String>,

    /// DuckDuckGo safe search level: on, moderate or off
    #[arg(long)]
    pub safe_search: Option<SafeSearch>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ask a single question and exit instead of starting the REPL
    pub prompt: Option<String>,
}

impl Cli {
    /// Resolve config: file, then env, then command-line flags.
    pub fn load_config(&self) -> crate::error::Result<ScoutConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ScoutConfig::from_file(path)?;
                config.apply_env();
                config
            }
            None => ScoutConfig::load()?,
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Apply flag overrides.
    pub fn apply(&self, config: &mut ScoutConfig) {
        if let Some(model) = &self.model {
            config.set_model(model);
        }
        if let Some(n) = self.max_iterations {
            config.max_iterations = n;
        }
        if let Some(secs) = self.fetch_timeout {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(region) = &self.region {
            config.search_region = region.clone();
        }
        if let Some(level) = self.safe_search {
            config.safe_search = level;
        }
    }
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Clear,
    Quit,
    Usage,
    Models,
    Help,
    Ask(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "/clear" => Self::Clear,
            "/quit" | "/exit" => Self::Quit,
            "/usage" => Self::Usage,
            "/models" => Self::Models,
            "/help" => Self::Help,
            _ => Self::Ask(line.to_string()),
        }
    }
}

pub const REPL_HELP: &str = "\
Commands:
  /clear   start a new conversation
  /usage   show tokens used and estimated cost
  /models  list the suggested models (pick one with --model)
  /quit    exit
Anything else is sent as a question.";

/// The suggested models, one per line, marking the session's model.
pub fn model_listing(current: &OpenAiModel) -> String {
    let mut lines: Vec<String> = OpenAiModel::SELECTABLE
        .iter()
        .map(|model| {
            let marker = if model == current { "*" } else { " " };
            format!("{marker} {:<18} {}", model.as_str(), model.label())
        })
        .collect();
    if !OpenAiModel::SELECTABLE.contains(current) {
        lines.push(format!("* {:<18} custom", current.as_str()));
    }
    lines.join("\n")
}
