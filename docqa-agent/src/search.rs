//! Web search tool backed by the Tavily API.

use async_trait::async_trait;
use docqa_core::{Error, Result, Tool};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const TAVILY_API_URL: &str = "https://api.tavily.com/search";

const TOOL_NAME: &str = "tavily_search_results_json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WebResult>,
}

/// Searches the web and returns results as a compact JSON array of
/// `{title, url, content}` objects.
pub struct TavilySearchTool {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_results: usize,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: TAVILY_API_URL.to_string(),
            max_results: 5,
        }
    }

    /// Build the tool from `TAVILY_API_KEY`, or `None` when it is unset or empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("TAVILY_API_KEY").ok().filter(|key| !key.is_empty()).map(Self::new)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn parse_results(body: &str) -> Result<Vec<WebResult>> {
    serde_json::from_str::<SearchResponse>(body)
        .map(|response| response.results)
        .map_err(|e| Error::tool(TOOL_NAME, format!("failed to parse response: {e}")))
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A search engine optimized for comprehensive, accurate, and trusted results. Useful for when you need to answer questions about current events. Input should be a search query."
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        info!(query = input, "web search called");

        let request = SearchRequest { api_key: &self.api_key, query: input, max_results: self.max_results };
        let response = self.client.post(&self.endpoint).json(&request).send().await.map_err(|e| {
            error!(error = %e, "web search request failed");
            Error::tool(TOOL_NAME, format!("request failed: {e}"))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::tool(TOOL_NAME, format!("failed to read response: {e}")))?;
        if !status.is_success() {
            error!(%status, "web search returned an error status");
            return Err(Error::tool(TOOL_NAME, format!("search failed with {status}: {body}")));
        }

        let results = parse_results(&body)?;
        serde_json::to_string(&results)
            .map_err(|e| Error::tool(TOOL_NAME, format!("failed to serialize results: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tavily_response() {
        let body = r#"{
            "query": "langsmith testing",
            "response_time": 1.2,
            "results": [
                {"title": "LangSmith", "url": "https://smith.langchain.com", "content": "Trace and evaluate.", "score": 0.98},
                {"title": "Docs", "url": "https://docs.smith.langchain.com", "content": "User guide.", "score": 0.91}
            ]
        }"#;
        let results = parse_results(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://smith.langchain.com");

        let compact = serde_json::to_string(&results).unwrap();
        assert!(!compact.contains("score"));
    }

    #[test]
    fn malformed_response_is_tool_error() {
        assert!(matches!(parse_results("<html>"), Err(Error::ToolInvocation { .. })));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_tool_error() {
        let tool = TavilySearchTool::new("tvly-test").with_endpoint("http://127.0.0.1:9/search");
        let err = tool.invoke("langsmith").await.unwrap_err();
        assert!(matches!(err, Error::ToolInvocation { .. }));
    }
}
