//! Data types for documents, segments, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the URL a document was loaded from.
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the page title, when one was found.
pub const TITLE_KEY: &str = "title";
/// Metadata key holding a segment's position within its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";
/// Metadata key holding a segment's character offset within its document.
pub const START_INDEX_KEY: &str = "start_index";

/// A loaded page: its text plus string metadata such as `source` and `title`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The page URL for web documents.
    pub id: String,
    /// Extracted text.
    pub content: String,
    /// `source`, `title` and anything the loader adds.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into(), metadata: HashMap::new() }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A contiguous slice of a [`Document`] produced by chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Unique identifier, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// The text content of the segment.
    pub content: String,
    /// Character offset of `content` within the parent document.
    pub start_index: usize,
    /// Metadata inherited from the parent document plus `chunk_index` and `start_index`.
    pub metadata: HashMap<String, String>,
}

impl Segment {
    /// Length of the segment in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A retrieved [`Segment`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved segment.
    pub segment: Segment,
    /// Similarity to the query; higher ranks first.
    pub score: f32,
}
