//! Text-to-vector seam used by the index and the retriever.

use async_trait::async_trait;
use docqa_core::Result;

/// Turns text into fixed-length vectors.
///
/// The same model must map the same text to the same vector; the index
/// compares query vectors against segment vectors computed earlier.
/// Backends without a batch endpoint can rely on the sequential default of
/// [`embed_batch`](EmbeddingProvider::embed_batch).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;
}
