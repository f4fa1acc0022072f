//! Embeddings from an OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;
use docqa_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Output size of `text-embedding-3-small`.
const SMALL_MODEL_DIMENSIONS: usize = 1536;

const PROVIDER: &str = "OpenAI";

/// Embeds segments and queries through the OpenAI embeddings API.
///
/// A whole batch goes out in one request. Point it at a local server with
/// [`with_base_url`](Self::with_base_url); the key is still sent as a bearer
/// token.
///
/// ```rust,ignore
/// let embedder = OpenAIEmbeddingProvider::from_env()?.with_model("text-embedding-3-large");
/// let vectors = embedder.embed_batch(&["LangSmith", "tracing"]).await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// Sent as `dimensions` to shorten the returned vectors.
    truncate_to: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] for an empty key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key: String = api_key.into();
        if api_key.is_empty() {
            return Err(Error::embedding(PROVIDER, "API key must not be empty"));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: SMALL_MODEL_DIMENSIONS,
            truncate_to: None,
        })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::embedding(PROVIDER, "OPENAI_API_KEY is not set"))?;
        Self::new(api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use an OpenAI-compatible server instead of api.openai.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Ask the API for vectors of `dims` entries.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.truncate_to = Some(dims);
        self
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = WireRequest { model: &self.model, input: texts, dimensions: self.truncate_to };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                Error::embedding(PROVIDER, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            error!(provider = PROVIDER, %status, "embedding API error");
            return Err(Error::embedding(PROVIDER, format!("API returned {status}: {message}")));
        }

        let parsed: WireResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "unreadable embedding response");
            Error::embedding(PROVIDER, format!("failed to parse response: {e}"))
        })?;
        Ok(in_input_order(parsed.data))
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct WireResponse {
    data: Vec<WireEmbedding>,
}

#[derive(Deserialize)]
struct WireEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: String,
}

/// The API tags each vector with the position of its input.
fn in_input_order(mut data: Vec<WireEmbedding>) -> Vec<Vec<f32>> {
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text])
            .await?
            .pop()
            .ok_or_else(|| Error::embedding(PROVIDER, "API returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(provider = PROVIDER, model = %self.model, batch_size = texts.len(), "embedding batch");
        self.request(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(OpenAIEmbeddingProvider::new(""), Err(Error::Embedding { .. })));
    }

    #[test]
    fn response_is_reordered_by_index() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let response: WireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(in_input_order(response.data), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            OpenAIEmbeddingProvider::new("sk-test").unwrap().with_base_url("http://localhost:8080/v1/");
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }
}
