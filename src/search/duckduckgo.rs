//! DuckDuckGo "lite" HTML backend.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{RawHit, SafeSearch, SearchBackend, SearchQuery};
use crate::error::{Result, ScoutError};
use crate::provider::http::build_client;

pub const DEFAULT_BASE_URL: &str = "https://lite.duckduckgo.com";

#[derive(Debug, Clone)]
pub struct DuckDuckGoLite {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoLite {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn safe_search_param(safe_search: SafeSearch) -> &'static str {
    match safe_search {
        SafeSearch::On => "1",
        SafeSearch::Moderate => "-1",
        SafeSearch::Off => "-2",
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoLite {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawHit>> {
        let url = format!("{}/lite/", self.base_url);
        debug!(url = %url, query = %query.text, region = %query.region, "duckduckgo request");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/html")
            .form(&[
                ("q", query.text.as_str()),
                ("kl", query.region.as_str()),
                ("kp", safe_search_param(query.safe_search)),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScoutError::Search(format!(
                "duckduckgo returned status {}",
                status.as_u16()
            )));
        }
        let body = response.text().await?;

        // `Html` is !Send; parsing stays in this sync call.
        parse_results(&body)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Search(format!("invalid selector {css}: {e}")))
}

fn collapse(text: String) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_sponsored(el: &ElementRef<'_>) -> bool {
    el.ancestors().filter_map(ElementRef::wrap).any(|a| {
        a.value()
            .attr("class")
            .is_some_and(|c| c.contains("result-sponsored"))
    })
}

/// Parse a lite results page. Links and snippets come in separate table rows;
/// a snippet belongs to the link that precedes it.
pub fn parse_results(html: &str) -> Result<Vec<RawHit>> {
    let doc = Html::parse_document(html);
    let items = selector("a.result-link, td.result-snippet")?;

    let mut hits: Vec<RawHit> = Vec::new();
    let mut skipping = false;
    for el in doc.select(&items) {
        let text = collapse(el.text().collect());
        if el.value().name() == "a" {
            skipping = is_sponsored(&el);
            if skipping {
                continue;
            }
            hits.push(RawHit {
                title: Some(text).filter(|t| !t.is_empty()),
                body: None,
                href: el.value().attr("href").map(unwrap_redirect),
            });
        } else if !skipping {
            if let Some(last) = hits.last_mut() {
                if last.body.is_none() && !text.is_empty() {
                    last.body = Some(text);
                }
            }
        }
    }
    Ok(hits)
}

/// Resolve a result href, following DuckDuckGo's `/l/?uddg=` redirect wrapper.
pub fn unwrap_redirect(href: &str) -> String {
    let href = href.trim();
    let resolved = match Url::parse(DEFAULT_BASE_URL).and_then(|base| base.join(href)) {
        Ok(url) => url,
        Err(_) => return href.to_string(),
    };
    let is_ddg = resolved
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    if is_ddg && resolved.path().starts_with("/l/") {
        if let Some((_, target)) = resolved.query_pairs().find(|(k, _)| k == "uddg") {
            return target.into_owned();
        }
    }
    resolved.to_string()
}
