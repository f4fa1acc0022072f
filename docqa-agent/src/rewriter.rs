//! History-aware query rewriting.

use std::sync::Arc;

use docqa_core::{
    CancellationToken, ChatHistory, ChatModel, ChatRequest, Error, ModelOutput, Result, cancellable,
};
use tracing::debug;

use crate::prompt::{RewriteContext, rewrite_messages};

/// Turns a follow-up question into a standalone search query.
///
/// With an empty history the input is already standalone and is returned
/// unchanged without calling the model.
#[derive(Clone)]
pub struct QueryRewriter {
    model: Arc<dyn ChatModel>,
    temperature: Option<f32>,
}

impl QueryRewriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, temperature: None }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Rewrite `input` in the light of `history`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the model fails or answers with a
    /// tool call, and [`Error::Cancelled`] if `cancel` fires.
    pub async fn rewrite(
        &self,
        history: &ChatHistory,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if history.is_empty() {
            return Ok(input.to_string());
        }

        let mut request = ChatRequest::new(rewrite_messages(&RewriteContext { history, input }));
        request.temperature = self.temperature;

        match cancellable(cancel, self.model.complete(request)).await? {
            ModelOutput::Text(query) => {
                let query = query.trim().to_string();
                debug!(input, query = %query, "rewrote query");
                Ok(query)
            }
            ModelOutput::ToolCall(call) => Err(Error::generation(
                self.model.name(),
                format!("expected a search query, got a call to tool '{}'", call.tool_name),
            )),
        }
    }
}
