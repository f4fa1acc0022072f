//! In-memory vector index.
//!
//! [`VectorIndex`] stores `(embedding, segment)` pairs in insertion order.
//! It is built once from a set of segments and never mutated afterwards, so
//! it can be shared between tasks behind an `Arc` without locking.

use docqa_core::{CancellationToken, Error, Result, cancellable};
use tracing::{debug, error, info};

use crate::config::Similarity;
use crate::document::{SearchResult, Segment};
use crate::embedding::EmbeddingProvider;

#[derive(Debug, Clone)]
struct Entry {
    embedding: Vec<f32>,
    segment: Segment,
}

/// An immutable, insertion-ordered store of embedded segments.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{HashEmbeddingProvider, Similarity, VectorIndex};
///
/// let embedder = HashEmbeddingProvider::default();
/// let index = VectorIndex::build(segments, &embedder, 64, Similarity::Cosine, &token).await?;
/// let results = index.query("What is LangSmith used for?", 4, &embedder).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
    similarity: Similarity,
}

impl VectorIndex {
    /// Embed every segment and store it alongside its vector.
    ///
    /// Segments are sent to `embedder` in batches of `batch_size` (at least 1).
    /// The build is all-or-nothing: if any batch fails, or returns a different
    /// number of vectors than it was given, no index is produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] on provider failure or a vector count
    /// mismatch, and [`Error::Cancelled`] if `cancel` fires mid-build.
    pub async fn build(
        segments: Vec<Segment>,
        embedder: &dyn EmbeddingProvider,
        batch_size: usize,
        similarity: Similarity,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(segments.len());
        let mut pending = segments.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<Segment> = pending.by_ref().take(batch_size).collect();
            let texts: Vec<&str> = batch.iter().map(|s| s.content.as_str()).collect();

            let embeddings =
                cancellable(cancel, embedder.embed_batch(&texts)).await.map_err(|e| {
                    if !e.is_cancelled() {
                        error!(provider = embedder.name(), error = %e, "embedding failed during index build");
                    }
                    e
                })?;

            if embeddings.len() != batch.len() {
                error!(
                    provider = embedder.name(),
                    expected = batch.len(),
                    actual = embeddings.len(),
                    "embedding count mismatch"
                );
                return Err(Error::embedding(
                    embedder.name(),
                    format!("expected {} embeddings, got {}", batch.len(), embeddings.len()),
                ));
            }

            debug!(batch_size = batch.len(), "embedded batch");
            entries.extend(
                batch
                    .into_iter()
                    .zip(embeddings)
                    .map(|(segment, embedding)| Entry { embedding, segment }),
            );
        }

        info!(provider = embedder.name(), segment_count = entries.len(), "built vector index");
        Ok(Self { entries, similarity })
    }

    /// Number of segments in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// Iterate over the stored segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.entries.iter().map(|entry| &entry.segment)
    }

    /// Return up to `k` segments ordered by descending similarity to `embedding`.
    ///
    /// Equal scores keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIndex`] if the index holds no segments.
    pub fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                segment: entry.segment.clone(),
                score: self.similarity.score(&entry.embedding, embedding),
            })
            .collect();

        // `sort_by` is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    /// Embed `text` with `embedder` and [`search`](Self::search) for it.
    ///
    /// The emptiness check happens before the embedding call.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let embedding = embedder.embed(text).await?;
        self.search(&embedding, k)
    }
}
