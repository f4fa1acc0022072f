//! # docqa-rag
//!
//! Document loading, chunking, embedding and retrieval for docqa.
//!
//! ## Overview
//!
//! - [`WebLoader`] - fetches a page and extracts its visible text
//! - [`RecursiveChunker`] - splits documents into overlapping segments
//! - [`EmbeddingProvider`] - [`OpenAIEmbeddingProvider`] or the offline [`HashEmbeddingProvider`]
//! - [`VectorIndex`] - immutable in-memory index built once per session
//! - [`Retriever`] / [`RetrieverTool`] - top-K search, directly or as an agent tool
//! - [`IngestPipeline`] - fetch → split → embed → index with an [`IngestReport`]

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod hashing;
pub mod index;
pub mod loader;
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod tool;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder, Similarity};
pub use document::{Document, SearchResult, Segment};
pub use embedding::EmbeddingProvider;
pub use hashing::HashEmbeddingProvider;
pub use index::VectorIndex;
pub use loader::{DocumentSource, HtmlExtractor, WebLoader};
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{IngestPipeline, IngestPipelineBuilder, IngestReport, Ingested};
pub use retriever::Retriever;
pub use tool::RetrieverTool;
