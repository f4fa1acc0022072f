//! Composed question-answering chains.
//!
//! - [`DirectChat`]: persona prompt straight to the model, no retrieval.
//! - [`RetrievalChain`]: retrieve for the input, then answer from the segments.
//! - [`ConversationalRag`]: rewrite the input against the history, retrieve
//!   for the rewritten query, then answer the original input with history.

use std::sync::Arc;

use docqa_core::{
    CancellationToken, ChatHistory, ChatModel, ChatRequest, Error, Result, cancellable,
};
use docqa_rag::{Retriever, SearchResult, Segment};
use serde::Serialize;
use tracing::{info, instrument};

use crate::generator::AnswerGenerator;
use crate::prompt::{DirectContext, direct_messages};
use crate::rewriter::QueryRewriter;

/// The answer from a retrieval chain with the evidence behind it.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    /// The query that was sent to the retriever.
    pub query: String,
    pub sources: Vec<SearchResult>,
}

fn segments_of(results: &[SearchResult]) -> Vec<Segment> {
    results.iter().map(|r| r.segment.clone()).collect()
}

/// Sends the input to the model under the documentation-writer persona.
#[derive(Clone)]
pub struct DirectChat {
    model: Arc<dyn ChatModel>,
    temperature: Option<f32>,
}

impl DirectChat {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, temperature: None }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub async fn invoke(&self, input: &str, cancel: &CancellationToken) -> Result<String> {
        let mut request = ChatRequest::new(direct_messages(&DirectContext { input }));
        request.temperature = self.temperature;

        cancellable(cancel, self.model.complete(request)).await?.into_text().ok_or_else(|| {
            Error::generation(self.model.name(), "expected text, got a tool call")
        })
    }
}

/// Single-turn retrieval-augmented answering.
#[derive(Clone)]
pub struct RetrievalChain {
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl RetrievalChain {
    pub fn new(retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self { retriever, generator }
    }

    #[instrument(skip(self, cancel))]
    pub async fn ask(&self, input: &str, cancel: &CancellationToken) -> Result<RagAnswer> {
        let sources = self.retriever.retrieve(input, cancel).await?;
        let answer = self
            .generator
            .generate(&segments_of(&sources), &ChatHistory::new(), input, cancel)
            .await?;

        info!(source_count = sources.len(), "answered question");
        Ok(RagAnswer { answer, query: input.to_string(), sources })
    }
}

/// Multi-turn retrieval-augmented answering.
#[derive(Clone)]
pub struct ConversationalRag {
    rewriter: QueryRewriter,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl ConversationalRag {
    pub fn new(rewriter: QueryRewriter, retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self { rewriter, retriever, generator }
    }

    /// Answer `input` given the prior `history`.
    ///
    /// The caller owns the history; append the exchange after a successful answer.
    #[instrument(skip(self, history, cancel), fields(history_len = history.len()))]
    pub async fn ask(
        &self,
        history: &ChatHistory,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<RagAnswer> {
        let query = self.rewriter.rewrite(history, input, cancel).await?;
        let sources = self.retriever.retrieve(&query, cancel).await?;
        let answer =
            self.generator.generate(&segments_of(&sources), history, input, cancel).await?;

        info!(query = %query, source_count = sources.len(), "answered follow-up");
        Ok(RagAnswer { answer, query, sources })
    }
}
