//! Paginated page fetching.
//!
//! A page is downloaded, reduced to its main readable content, rendered as
//! markdown-like text and split into token-bounded chunks. Callers ask for one
//! chunk at a time by 1-based page number.
//!
//! Fetch problems are never errors: they come back as
//! [`PageFetchResult::Failure`] so the model can read them and move on.

pub mod chunk;
pub mod extract;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bon::Builder;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::error::Result;
use crate::models::OpenAiModel;
use crate::provider::http::build_client;

pub use chunk::{TokenSplitter, TokenizerError, DEFAULT_CHUNK_TOKENS};
pub use extract::{extract_readable, html_to_markdown, ReadableContent, NO_TITLE};

pub const TIMEOUT_MESSAGE: &str =
    "Could not download page due to Timeout Error. Please try to fetch other pages.";
pub const DOWNLOAD_MESSAGE: &str = "Could not download page. Please try to fetch other pages.";
pub const PARSE_MESSAGE: &str = "Could not parse page. Please try to fetch other pages.";
pub const INVALID_PAGE_MESSAGE: &str =
    "page parameter looks invalid. Please try to fetch other pages.";
pub const INVALID_URL_MESSAGE: &str =
    "url looks invalid. Please pass an absolute http(s) URL or try other pages.";

/// One fetch request.
#[derive(Debug, Clone, Builder)]
pub struct PageFetchRequest {
    #[builder(into)]
    pub url: String,
    /// 1-based page number. A `page` query parameter in `url` takes precedence.
    #[builder(default = 1)]
    pub page: i64,
    /// Model id whose tokenizer measures chunk sizes.
    #[builder(into, default = OpenAiModel::default().to_string())]
    pub model: String,
    /// Overrides the fetcher's default timeout.
    pub timeout: Option<Duration>,
}

/// Outcome of a fetch, as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetchResult {
    Success {
        title: String,
        content: String,
        has_next: bool,
    },
    Failure {
        status_code: u16,
        error_message: String,
    },
}

impl PageFetchResult {
    pub fn failure(status_code: u16, error_message: impl Into<String>) -> Self {
        Self::Failure {
            status_code,
            error_message: error_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Failure { status_code, .. } => *status_code,
        }
    }

    /// JSON observation handed back to the model.
    pub fn to_observation(&self) -> serde_json::Value {
        match self {
            Self::Success {
                title,
                content,
                has_next,
            } => json!({
                "status": 200,
                "page_content": {
                    "title": title,
                    "content": content,
                    "has_next": has_next,
                },
            }),
            Self::Failure {
                status_code,
                error_message,
            } => json!({
                "status": status_code,
                "page_content": { "error_message": error_message },
            }),
        }
    }
}

/// Fetches pages and serves them chunk by chunk.
///
/// Configuration is immutable. Tokenizers are loaded once per model and reused.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    chunk_tokens: usize,
    splitters: Arc<Mutex<HashMap<String, Arc<TokenSplitter>>>>,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
            chunk_tokens: DEFAULT_CHUNK_TOKENS,
            splitters: Arc::default(),
        })
    }

    /// Override the chunk budget (tokens per page).
    pub fn with_chunk_tokens(mut self, chunk_tokens: usize) -> Self {
        self.chunk_tokens = chunk_tokens.max(1);
        self.splitters = Arc::default();
        self
    }

    /// The splitter for `model`, built on first use.
    pub fn splitter(&self, model: &str) -> std::result::Result<Arc<TokenSplitter>, TokenizerError> {
        let mut splitters = self
            .splitters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(splitter) = splitters.get(model) {
            return Ok(splitter.clone());
        }
        let splitter = Arc::new(TokenSplitter::for_model(model, self.chunk_tokens)?);
        debug!(model, chunk_tokens = self.chunk_tokens, "tokenizer loaded");
        splitters.insert(model.to_string(), splitter.clone());
        Ok(splitter)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch(&self, request: &PageFetchRequest) -> PageFetchResult {
        let (target, page) = match resolve_target(&request.url, request.page) {
            Ok(resolved) => resolved,
            Err(failure) => return failure,
        };
        let timeout = request.timeout.unwrap_or(self.timeout);
        debug!(url = %target, page, timeout_ms = timeout.as_millis() as u64, "fetching page");

        let response = match self.client.get(target.clone()).timeout(timeout).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                warn!(url = %target, "page fetch timed out");
                return PageFetchResult::failure(500, TIMEOUT_MESSAGE);
            }
            Err(err) => {
                warn!(url = %target, error = %err, "page fetch failed");
                return PageFetchResult::failure(500, DOWNLOAD_MESSAGE);
            }
        };

        let status = response.status().as_u16();
        if status != 200 {
            debug!(url = %target, status, "page fetch returned non-200");
            return PageFetchResult::failure(status, DOWNLOAD_MESSAGE);
        }

        let body = match response.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) if err.is_timeout() => return PageFetchResult::failure(500, TIMEOUT_MESSAGE),
            Err(err) => {
                warn!(url = %target, error = %err, "reading page body failed");
                return PageFetchResult::failure(500, DOWNLOAD_MESSAGE);
            }
        };

        self.paginate(&body, page, &request.model)
    }

    /// Extract, render, chunk and pick the requested page from raw HTML.
    pub fn paginate(&self, html: &str, page: i64, model: &str) -> PageFetchResult {
        let readable = match extract_readable(html) {
            Ok(readable) => readable,
            Err(err) => {
                debug!(error = %err, "readable extraction failed");
                return PageFetchResult::failure(500, PARSE_MESSAGE);
            }
        };
        let text = match html_to_markdown(&readable.html) {
            Ok(text) => text,
            Err(err) => {
                debug!(error = %err, "markdown conversion failed");
                return PageFetchResult::failure(500, PARSE_MESSAGE);
            }
        };
        let splitter = match self.splitter(model) {
            Ok(splitter) => splitter,
            Err(err) => {
                warn!(error = %err, "tokenizer unavailable");
                return PageFetchResult::failure(500, PARSE_MESSAGE);
            }
        };

        let chunks = splitter.split(&text);
        let index = match usize::try_from(page - 1) {
            Ok(index) if index < chunks.len() => index,
            _ => {
                debug!(page, chunks = chunks.len(), "requested page out of range");
                return PageFetchResult::failure(500, INVALID_PAGE_MESSAGE);
            }
        };
        debug!(page, chunks = chunks.len(), "serving page");

        let has_next = index + 1 < chunks.len();
        let content = chunks.into_iter().nth(index).unwrap_or_default();
        PageFetchResult::Success {
            title: readable.title,
            content,
            has_next,
        }
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            chunk_tokens: DEFAULT_CHUNK_TOKENS,
            splitters: Arc::default(),
        }
    }
}

/// Resolve the request URL and effective page number.
///
/// A `page` query parameter overrides `page`. The outgoing URL is the canonical
/// page: scheme, host and path only, with the query and fragment removed.
pub fn resolve_target(raw: &str, page: i64) -> std::result::Result<(Url, i64), PageFetchResult> {
    let mut url = match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => url,
        _ => return Err(PageFetchResult::failure(400, INVALID_URL_MESSAGE)),
    };

    let page = match url.query_pairs().find(|(key, _)| key == "page") {
        Some((_, value)) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| PageFetchResult::failure(500, INVALID_PAGE_MESSAGE))?,
        None => page,
    };
    if page < 1 {
        return Err(PageFetchResult::failure(500, INVALID_PAGE_MESSAGE));
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok((url, page))
}
