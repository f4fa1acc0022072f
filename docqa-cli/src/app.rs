//! Wires settings into models, pipelines and tools.

use std::sync::Arc;

use docqa_agent::{AgentExecutor, AnswerGenerator, ConversationalRag, QueryRewriter, RetrievalChain, TavilySearchTool};
use docqa_core::{CancellationToken, ChatModel, Result, ToolRegistry};
use docqa_model::OpenAIChatModel;
use docqa_rag::{
    EmbeddingProvider, HashEmbeddingProvider, IngestPipeline, Ingested, OpenAIEmbeddingProvider,
    Retriever, RetrieverTool, WebLoader,
};
use tracing::info;

use crate::settings::{EmbeddingBackend, Settings};

/// Everything a subcommand needs, built once from [`Settings`].
pub struct App {
    settings: Settings,
    cancel: CancellationToken,
}

impl App {
    pub fn new(settings: Settings, cancel: CancellationToken) -> Self {
        Self { settings, cancel }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn chat_model(&self) -> Result<Arc<dyn ChatModel>> {
        Ok(Arc::new(OpenAIChatModel::new(self.settings.openai_config()?)?))
    }

    pub fn embedding_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        Ok(match self.settings.embeddings {
            EmbeddingBackend::Hashing => Arc::new(HashEmbeddingProvider::default()),
            EmbeddingBackend::Openai => {
                let mut provider = OpenAIEmbeddingProvider::new(self.settings.api_key()?)?
                    .with_model(&self.settings.embedding_model);
                if let Some(base_url) = self.settings.openai_base_url.as_deref().filter(|u| !u.is_empty()) {
                    provider = provider.with_base_url(base_url);
                }
                Arc::new(provider)
            }
        })
    }

    pub fn pipeline(&self) -> Result<IngestPipeline> {
        IngestPipeline::builder()
            .config(self.settings.rag_config()?)
            .source(Arc::new(WebLoader::with_selector(&self.settings.selector)?))
            .embedding_provider(self.embedding_provider()?)
            .build()
    }

    /// Load the configured page and index it.
    pub async fn ingest(&self) -> Result<(IngestPipeline, Ingested)> {
        let pipeline = self.pipeline()?;
        let ingested = pipeline.ingest_url(&self.settings.url, &self.cancel).await?;
        info!(url = %self.settings.url, segment_count = ingested.report.segment_count, "page indexed");
        Ok((pipeline, ingested))
    }

    pub fn generator(&self, model: Arc<dyn ChatModel>) -> AnswerGenerator {
        AnswerGenerator::new(model).with_temperature(self.settings.temperature)
    }

    pub fn retrieval_chain(&self, model: Arc<dyn ChatModel>, retriever: Retriever) -> RetrievalChain {
        RetrievalChain::new(retriever, self.generator(model))
    }

    pub fn conversational_chain(
        &self,
        model: Arc<dyn ChatModel>,
        retriever: Retriever,
    ) -> ConversationalRag {
        ConversationalRag::new(
            QueryRewriter::new(model.clone()).with_temperature(self.settings.temperature),
            retriever,
            self.generator(model),
        )
    }

    /// The docs search tool, plus web search when a Tavily key is configured.
    pub fn agent_tools(&self, retriever: Retriever) -> Result<ToolRegistry> {
        let mut tools = ToolRegistry::new()
            .with_tool(Arc::new(RetrieverTool::new(retriever).with_cancellation(self.cancel.clone())))?;
        if let Some(key) = self.settings.tavily_key() {
            tools.register(Arc::new(TavilySearchTool::new(key)))?;
        } else {
            info!("TAVILY_API_KEY not set; web search disabled");
        }
        Ok(tools)
    }

    pub fn agent(&self, model: Arc<dyn ChatModel>, tools: ToolRegistry) -> AgentExecutor {
        AgentExecutor::new(model, tools, self.settings.agent_config())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use docqa_core::Error;

    use super::*;
    use crate::settings::Cli;

    fn app(args: &[&str]) -> App {
        App::new(Cli::try_parse_from(args).unwrap().settings, CancellationToken::new())
    }

    #[test]
    fn hashing_backend_needs_no_key() {
        let app = app(&["docqa", "load", "--embeddings", "hashing"]);
        assert_eq!(app.embedding_provider().unwrap().name(), "hashing");
        assert!(app.pipeline().is_ok());
    }

    #[test]
    fn bad_selector_is_a_config_error() {
        let app = app(&["docqa", "load", "--embeddings", "hashing", "--selector", "[[["]);
        assert!(matches!(app.pipeline(), Err(Error::Config(_))));
    }

    #[test]
    fn web_search_registered_only_with_key() {
        let with_key = app(&["docqa", "agent", "hi", "--tavily-api-key", "tvly-test"]);
        let retriever = Retriever::new(
            Arc::new(docqa_rag::VectorIndex::default()),
            Arc::new(HashEmbeddingProvider::default()),
            4,
        );
        let tools = with_key.agent_tools(retriever.clone()).unwrap();
        let names: Vec<&str> = tools.names().collect();
        assert!(names.contains(&"docs_search"));
        assert!(names.contains(&"tavily_search_results_json"));

        let without_key = app(&["docqa", "agent", "hi", "--tavily-api-key", ""]);
        assert_eq!(without_key.agent_tools(retriever).unwrap().len(), 1);
    }
}
