//! Context-grounded answer generation.

use std::sync::Arc;

use docqa_core::{
    CancellationToken, ChatHistory, ChatModel, ChatRequest, Error, ModelOutput, Result, cancellable,
};
use docqa_rag::Segment;
use tracing::{debug, error};

use crate::prompt::{AnswerContext, answer_messages};

/// Answers a question from retrieved segments with a single model call.
///
/// The model's text is returned verbatim. There is no retry.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    temperature: Option<f32>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, temperature: None }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Generate an answer to `input` using `segments` as context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the model fails or answers with a
    /// tool call, and [`Error::Cancelled`] if `cancel` fires.
    pub async fn generate(
        &self,
        segments: &[Segment],
        history: &ChatHistory,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let mut request =
            ChatRequest::new(answer_messages(&AnswerContext { segments, history, input }));
        request.temperature = self.temperature;

        debug!(segment_count = segments.len(), history_len = history.len(), "generating answer");

        let output = cancellable(cancel, self.model.complete(request)).await.map_err(|e| {
            if !e.is_cancelled() {
                error!(model = self.model.name(), error = %e, "answer generation failed");
            }
            e
        })?;

        match output {
            ModelOutput::Text(answer) => Ok(answer),
            ModelOutput::ToolCall(call) => Err(Error::generation(
                self.model.name(),
                format!("expected an answer, got a call to tool '{}'", call.tool_name),
            )),
        }
    }
}
