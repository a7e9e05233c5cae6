//! Built-in research tools: `fetch_page` and `search_ddg`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::fetch::{PageFetchRequest, PageFetcher};
use crate::search::{SearchClient, DEFAULT_MAX_RESULTS};
use crate::tools::arguments::ToolArguments;
use crate::tools::tool::{Tool, ToolExecutionContext};
use crate::tools::types::ToolParameters;

const FETCH_PAGE_DESCRIPTION: &str = "\
Tool to fetch the content of a web page from a given URL.

This returns `status` and `page_content` (`title`, `content` and `has_next` indicator).
If status is not 200, there was some error fetching the page. (Try fetching other pages.)
If a status code other than 200 is returned, please don't give up and make sure to check other pages.

By default, only up to 1,000 tokens of content are retrieved. If there is more content available on the page, the `has_next` value will be true.
To read the continuation, increment the `page` parameter with the same URL and call the tool again. (Paging starts at 1, so the next page is 2.)
e.g. https://www.obamalibrary.gov/obamas/president-barack-obama?page=2";

const SEARCH_DESCRIPTION: &str = "\
Tool for performing DuckDuckGo searches.
Enter the keywords you want to search for.
The title, snippet (description) and URL of each page in the search results will be returned.
The information available through this tool is QUITE CONDENSED and sometimes outdated.

If you can't find the information you're looking for, make sure to use the `fetch_page` tool to read the content of each page.
Feel free to use the most appropriate language for the context (not necessarily the user's language).
For example, for programming-related questions, it's best to search in English.";

/// The closed set of tools the agent ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum BuiltinTool {
    #[strum(serialize = "fetch_page")]
    FetchPage,
    #[strum(serialize = "search_ddg")]
    SearchDdg,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 2] = [BuiltinTool::SearchDdg, BuiltinTool::FetchPage];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchPage => "fetch_page",
            Self::SearchDdg => "search_ddg",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FetchPage => FETCH_PAGE_DESCRIPTION,
            Self::SearchDdg => SEARCH_DESCRIPTION,
        }
    }
}

/// `fetch_page {url, page?}`: one token-bounded page of a URL's readable content.
#[derive(Debug)]
pub struct FetchPageTool {
    fetcher: Arc<PageFetcher>,
    model: String,
    parameters: ToolParameters,
}

impl FetchPageTool {
    /// `model` selects the tokenizer used to size pages.
    pub fn new(fetcher: Arc<PageFetcher>, model: impl Into<String>) -> Self {
        Self {
            fetcher,
            model: model.into(),
            parameters: ToolParameters::object()
                .string("url", "Absolute http(s) URL of the page to read", true)
                .integer(
                    "page",
                    "1-based page number of the content to read (default 1)",
                    false,
                )
                .build(),
        }
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        BuiltinTool::FetchPage.name()
    }

    fn description(&self) -> &str {
        BuiltinTool::FetchPage.description()
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value> {
        let url = args.get_str("url")?;
        let page = args.get_i64_opt("page")?.unwrap_or(1);
        let request = PageFetchRequest::builder()
            .url(url)
            .page(page)
            .model(self.model.clone())
            .build();

        let result = self.fetcher.fetch(&request).await;
        debug!(url, page, status = result.status(), "fetch_page finished");
        Ok(result.to_observation())
    }
}

/// `search_ddg {query, max_result_num?}`: condensed search hits.
#[derive(Debug)]
pub struct SearchTool {
    client: Arc<SearchClient>,
    parameters: ToolParameters,
}

impl SearchTool {
    pub fn new(client: Arc<SearchClient>) -> Self {
        Self {
            client,
            parameters: ToolParameters::object()
                .string("query", "Keywords to search for", true)
                .integer(
                    "max_result_num",
                    "Maximum number of results to return (default 5)",
                    false,
                )
                .build(),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        BuiltinTool::SearchDdg.name()
    }

    fn description(&self) -> &str {
        BuiltinTool::SearchDdg.description()
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value> {
        let query = args.get_str("query")?;
        let max_results = match args.get_i64_opt("max_result_num")? {
            None => DEFAULT_MAX_RESULTS,
            Some(n) => usize::try_from(n).map_err(|_| {
                ScoutError::InvalidArgument(format!("max_result_num must not be negative: {n}"))
            })?,
        };

        let results = self.client.search(query, max_results).await?;
        Ok(serde_json::to_value(results)?)
    }
}
