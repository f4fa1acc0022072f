//! Exposes a [`Retriever`] to the agent as a [`Tool`].

use async_trait::async_trait;
use docqa_core::{CancellationToken, Error, Result, Tool};
use tracing::{error, info};

use crate::retriever::Retriever;

/// Default tool name.
pub const DEFAULT_NAME: &str = "docs_search";

/// Default tool description.
pub const DEFAULT_DESCRIPTION: &str =
    "Search the loaded documentation. For any questions about the documentation, you must use this tool!";

/// A retrieval tool returning the contents of the best-matching segments.
///
/// The output joins segment contents with blank lines. An empty result set
/// produces a short notice rather than an empty string so the model can tell
/// the search ran.
///
/// # Example
///
/// ```rust,ignore
/// let tool = RetrieverTool::new(retriever).with_name("langsmith_search");
/// registry.register(Arc::new(tool))?;
/// ```
pub struct RetrieverTool {
    retriever: Retriever,
    name: String,
    description: String,
    cancel: CancellationToken,
}

impl RetrieverTool {
    pub fn new(retriever: Retriever) -> Self {
        Self {
            retriever,
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Abort in-flight searches when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        info!(tool = %self.name, query = input, "retriever tool called");

        let results = self.retriever.retrieve(input, &self.cancel).await.map_err(|e| {
            if e.is_cancelled() {
                return e;
            }
            error!(tool = %self.name, error = %e, "retrieval failed");
            Error::tool(&self.name, format!("retrieval failed: {e}"))
        })?;

        if results.is_empty() {
            return Ok("No relevant documents found.".to_string());
        }

        Ok(results.iter().map(|r| r.segment.content.as_str()).collect::<Vec<_>>().join("\n\n"))
    }
}
