//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! cuts text preferring paragraph breaks, then line breaks, then sentence
//! ends, then spaces, then any character. Segments are exact slices of the
//! source text, so a document can be rebuilt from its segments' `start_index`.

use crate::config::RagConfig;
use crate::document::{CHUNK_INDEX_KEY, Document, START_INDEX_KEY, Segment};

/// Separators, coarsest first. A cut is made right after a separator.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " "];

/// Rank of a cut between two arbitrary characters. The end of the text ranks 0.
const CHAR_RANK: usize = SEPARATORS.len() + 1;

/// A strategy for splitting documents into segments.
pub trait Chunker: Send + Sync {
    /// Split a document into segments.
    ///
    /// Returns an empty `Vec` if the document has empty content.
    fn chunk(&self, document: &Document) -> Vec<Segment>;

    /// Split every document, preserving document order and segment order.
    fn split_documents(&self, documents: &[Document]) -> Vec<Segment> {
        documents.iter().flat_map(|document| self.chunk(document)).collect()
    }
}

/// Cuts text on the coarsest separator that fits.
///
/// Each segment ends at the farthest position, within `chunk_size`
/// characters of its start, that follows the coarsest separator available
/// there (`\n\n`, `\n`, `. `, `! `, `? `, ` `, or failing those any
/// character). The next segment starts at the earliest separator within the
/// last `chunk_overlap` characters, or at the cut itself when there is none.
/// A smaller `chunk_size` never produces fewer segments.
///
/// Segment IDs are generated as `{document_id}_{chunk_index}`.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let segments = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// `chunk_size` is raised to at least 1 and `chunk_overlap` is capped
    /// below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self { chunk_size, chunk_overlap: chunk_overlap.min(chunk_size - 1) }
    }

    /// Create a chunker using the sizes from a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

/// The rank of every char boundary in `text`; `offsets` holds their byte positions.
fn boundary_ranks(text: &str, offsets: &[usize]) -> Vec<usize> {
    let last = offsets.len() - 1;
    offsets
        .iter()
        .enumerate()
        .map(|(position, &byte)| {
            if position == last {
                return 0;
            }
            let prefix = &text[..byte];
            SEPARATORS.iter().position(|sep| prefix.ends_with(sep)).map_or(CHAR_RANK, |k| k + 1)
        })
        .collect()
}

/// The farthest best-ranked position in `(after, up_to]`.
fn best_cut(ranks: &[usize], after: usize, up_to: usize) -> usize {
    let mut cut = up_to;
    for position in (after + 1..=up_to).rev() {
        if ranks[position] < ranks[cut] {
            cut = position;
        }
    }
    cut
}

/// The first separator boundary in `[floor, cut]`, or `cut`.
fn overlap_start(ranks: &[usize], floor: usize, cut: usize) -> usize {
    (floor..=cut).find(|&position| ranks[position] < CHAR_RANK).unwrap_or(cut)
}

impl RecursiveChunker {
    /// Char ranges `(start, end)` of every segment, in order.
    fn cut_spans(&self, ranks: &[usize]) -> Vec<(usize, usize)> {
        let len = ranks.len() - 1;
        let mut spans = Vec::new();
        let (mut start, mut previous_end) = (0, 0);

        loop {
            // Ends strictly increase, so no segment repeats the previous one.
            let end = best_cut(ranks, previous_end, (start + self.chunk_size).min(len));
            spans.push((start, end));
            if end == len {
                return spans;
            }
            let floor = end.saturating_sub(self.chunk_overlap).max(start + 1);
            start = overlap_start(ranks, floor, end);
            previous_end = end;
        }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Segment> {
        if document.content.is_empty() {
            return Vec::new();
        }

        let text = &document.content;
        let offsets: Vec<usize> =
            text.char_indices().map(|(byte, _)| byte).chain(std::iter::once(text.len())).collect();
        let ranks = boundary_ranks(text, &offsets);

        self.cut_spans(&ranks)
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let mut metadata = document.metadata.clone();
                metadata.insert(CHUNK_INDEX_KEY.to_string(), i.to_string());
                metadata.insert(START_INDEX_KEY.to_string(), start.to_string());

                Segment {
                    id: format!("{}_{i}", document.id),
                    document_id: document.id.clone(),
                    content: text[offsets[start]..offsets[end]].to_string(),
                    start_index: start,
                    metadata,
                }
            })
            .collect()
    }
}
