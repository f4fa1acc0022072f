//! Query-time retrieval over a built [`VectorIndex`].

use std::sync::Arc;

use docqa_core::{CancellationToken, Result, cancellable};
use tracing::{debug, info};

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;

/// Embeds a query and returns the most similar segments from an index.
///
/// Results are ordered by descending score, truncated to `top_k`, and
/// filtered by `similarity_threshold`. A `Retriever` is cheap to clone; the
/// index and embedder are shared.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    similarity_threshold: f32,
}

impl Retriever {
    /// Create a retriever returning up to `top_k` results with no score threshold.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { index, embedder, top_k, similarity_threshold: f32::NEG_INFINITY }
    }

    /// Create a retriever using `top_k` and `similarity_threshold` from a [`RagConfig`].
    pub fn from_config(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Self {
        Self::new(index, embedder, config.top_k).with_threshold(config.similarity_threshold)
    }

    /// Drop results scoring below `threshold`.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Retrieve the segments most relevant to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`docqa_core::Error::EmptyIndex`] for an empty index,
    /// [`docqa_core::Error::Embedding`] if the query cannot be embedded, and
    /// [`docqa_core::Error::Cancelled`] if `cancel` fires first.
    pub async fn retrieve(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>> {
        debug!(query, top_k = self.top_k, "retrieving segments");

        let results =
            cancellable(cancel, self.index.query(query, self.top_k, self.embedder.as_ref())).await?;

        let threshold = self.similarity_threshold;
        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), "retrieval completed");
        Ok(filtered)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("index_len", &self.index.len())
            .field("embedder", &self.embedder.name())
            .field("top_k", &self.top_k)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish()
    }
}
