//! Setup-time ingestion: fetch → split → embed → index.
//!
//! The [`IngestPipeline`] composes a [`DocumentSource`], a [`Chunker`] and an
//! [`EmbeddingProvider`] and produces an immutable [`VectorIndex`] together
//! with an [`IngestReport`] describing what was loaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{IngestPipeline, RagConfig, RecursiveChunker, WebLoader};
//!
//! let pipeline = IngestPipeline::builder()
//!     .config(RagConfig::default())
//!     .source(Arc::new(WebLoader::new()?))
//!     .embedding_provider(Arc::new(embedder))
//!     .build()?;
//!
//! let ingested = pipeline.ingest_url("https://docs.smith.langchain.com/user_guide", &token).await?;
//! println!("{} segments", ingested.report.segment_count);
//! ```

use std::sync::Arc;

use docqa_core::{CancellationToken, Error, Result, cancellable};
use serde::Serialize;
use tracing::{info, instrument};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::loader::DocumentSource;
use crate::retriever::Retriever;

/// Statistics gathered while ingesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Number of documents loaded.
    pub document_count: usize,
    /// Total characters across all loaded documents.
    pub content_length: usize,
    /// Number of segments produced by the chunker.
    pub segment_count: usize,
    /// Characters in the first segment, if any.
    pub first_segment_length: Option<usize>,
}

/// The result of ingestion: a shareable index and its report.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub index: Arc<VectorIndex>,
    pub report: IngestReport,
}

/// Builds a [`VectorIndex`] from a document source.
///
/// Construct one via [`IngestPipeline::builder()`].
pub struct IngestPipeline {
    config: RagConfig,
    source: Option<Arc<dyn DocumentSource>>,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl IngestPipeline {
    /// Create a new [`IngestPipelineBuilder`].
    pub fn builder() -> IngestPipelineBuilder {
        IngestPipelineBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Fetch `url` from the configured source and index it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no source was configured, and otherwise
    /// propagates [`Error::Fetch`], [`Error::Embedding`] or [`Error::Cancelled`].
    #[instrument(skip(self, cancel))]
    pub async fn ingest_url(&self, url: &str, cancel: &CancellationToken) -> Result<Ingested> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| Error::Config("no document source configured".to_string()))?;
        let documents = cancellable(cancel, source.fetch(url)).await?;
        self.ingest_documents(&documents, cancel).await
    }

    /// Split and index documents that are already in memory.
    pub async fn ingest_documents(
        &self,
        documents: &[Document],
        cancel: &CancellationToken,
    ) -> Result<Ingested> {
        let segments = self.chunker.split_documents(documents);

        let report = IngestReport {
            document_count: documents.len(),
            content_length: documents.iter().map(|d| d.content.chars().count()).sum(),
            segment_count: segments.len(),
            first_segment_length: segments.first().map(|s| s.char_len()),
        };
        info!(
            document_count = report.document_count,
            content_length = report.content_length,
            segment_count = report.segment_count,
            "split documents"
        );

        let index = VectorIndex::build(
            segments,
            self.embedding_provider.as_ref(),
            self.config.embed_batch_size,
            self.config.similarity,
            cancel,
        )
        .await?;

        Ok(Ingested { index: Arc::new(index), report })
    }

    /// Create a [`Retriever`] over `index` using this pipeline's embedder and config.
    pub fn retriever(&self, index: Arc<VectorIndex>) -> Retriever {
        Retriever::from_config(index, self.embedding_provider.clone(), &self.config)
    }
}

/// Builder for constructing an [`IngestPipeline`].
///
/// The embedding provider is required. The config defaults to
/// [`RagConfig::default()`] and the chunker to a [`RecursiveChunker`] sized
/// from the config. The source is only needed for
/// [`ingest_url`](IngestPipeline::ingest_url).
#[derive(Default)]
pub struct IngestPipelineBuilder {
    config: Option<RagConfig>,
    source: Option<Arc<dyn DocumentSource>>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl IngestPipelineBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Build the [`IngestPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the embedding provider is missing.
    pub fn build(self) -> Result<IngestPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| Error::Config("embedding_provider is required".to_string()))?;
        let chunker =
            self.chunker.unwrap_or_else(|| Arc::new(RecursiveChunker::from_config(&config)));

        Ok(IngestPipeline { config, source: self.source, chunker, embedding_provider })
    }
}
