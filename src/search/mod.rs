//! Web search behind a pluggable backend.

pub mod duckduckgo;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_SEARCH_TIMEOUT;
use crate::error::{Result, ScoutError};
use crate::util::timeout::with_timeout;

pub use duckduckgo::DuckDuckGoLite;

/// Default number of results returned to the model.
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Worldwide region code.
pub const DEFAULT_REGION: &str = "wt-wt";

/// One search hit as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// A hit as reported by a backend; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub href: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum SafeSearch {
    On,
    Moderate,
    #[default]
    Off,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub region: String,
    pub safe_search: SafeSearch,
    pub max_results: usize,
}

/// A search engine the client can talk to.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Hits in relevance order. May return more than `query.max_results`.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawHit>>;
}

/// Bounded, normalized search over a [`SearchBackend`].
#[derive(Clone)]
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    region: String,
    safe_search: SafeSearch,
    timeout: Duration,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("backend", &self.backend.name())
            .field("region", &self.region)
            .field("safe_search", &self.safe_search)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            region: DEFAULT_REGION.to_string(),
            safe_search: SafeSearch::Off,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// DuckDuckGo lite at `base_url` (or the public endpoint).
    pub fn duckduckgo(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let backend = DuckDuckGoLite::new(base_url, timeout)?;
        Ok(Self::new(Arc::new(backend)).with_timeout(timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_safe_search(mut self, safe_search: SafeSearch) -> Self {
        self.safe_search = safe_search;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Search `query`, returning at most `max_results` hits in backend order.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let text = query.trim();
        if text.is_empty() {
            return Err(ScoutError::InvalidArgument("search query is empty".into()));
        }
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let request = SearchQuery {
            text: text.to_string(),
            region: self.region.clone(),
            safe_search: self.safe_search,
            max_results,
        };
        let hits = with_timeout(self.timeout, self.backend.search(&request)).await?;
        let raw_count = hits.len();

        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(normalize)
            .take(max_results)
            .collect();
        debug!(
            backend = self.backend.name(),
            query = text,
            raw_count,
            returned = results.len(),
            "search completed"
        );
        Ok(results)
    }
}

fn normalize(hit: RawHit) -> Option<SearchResult> {
    let title = hit.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let url = hit.href.map(|u| u.trim().to_string()).unwrap_or_default();
    if title.is_empty() && url.is_empty() {
        return None;
    }
    Some(SearchResult {
        title,
        snippet: hit.body.map(|b| b.trim().to_string()).unwrap_or_default(),
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct FixedBackend {
        hits: Vec<RawHit>,
        seen: Mutex<Vec<SearchQuery>>,
    }

    impl FixedBackend {
        fn new(hits: Vec<RawHit>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, query: &SearchQuery) -> Result<Vec<RawHit>> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.hits.clone())
        }
    }

    fn hit(n: usize) -> RawHit {
        RawHit {
            title: Some(format!("Result {n}")),
            body: Some(format!("Snippet {n}")),
            href: Some(format!("https://example.com/{n}")),
        }
    }

    #[tokio::test]
    async fn caps_results_and_keeps_order() {
        let backend = FixedBackend::new((1..=8).map(hit).collect());
        let client = SearchClient::new(backend.clone());

        let results = client.search("rust async", 5).await.unwrap();

        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Result 1", "Result 2", "Result 3", "Result 4", "Result 5"]);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].region, "wt-wt");
        assert_eq!(seen[0].safe_search, SafeSearch::Off);
        assert_eq!(seen[0].max_results, 5);
    }

    #[tokio::test]
    async fn missing_fields_become_empty_and_blank_hits_are_dropped() {
        let backend = FixedBackend::new(vec![
            RawHit {
                title: Some("Only a title".into()),
                ..Default::default()
            },
            RawHit::default(),
            RawHit {
                body: Some("snippet without title or url".into()),
                ..Default::default()
            },
            hit(2),
        ]);
        let client = SearchClient::new(backend);

        let results = client.search("q", 5).await.unwrap();

        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "Only a title".into(),
                    snippet: String::new(),
                    url: String::new(),
                },
                SearchResult {
                    title: "Result 2".into(),
                    snippet: "Snippet 2".into(),
                    url: "https://example.com/2".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let client = SearchClient::new(FixedBackend::new(vec![hit(1)]));
        let err = client.search("   ", 5).await.unwrap_err();
        assert!(matches!(err, ScoutError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn zero_limit_skips_backend() {
        let backend = FixedBackend::new(vec![hit(1)]);
        let client = SearchClient::new(backend.clone());
        assert!(client.search("q", 0).await.unwrap().is_empty());
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn safe_search_parses_from_str() {
        assert_eq!("off".parse::<SafeSearch>().unwrap(), SafeSearch::Off);
        assert_eq!(SafeSearch::Moderate.to_string(), "moderate");
    }
}
