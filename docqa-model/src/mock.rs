//! Scripted chat model for tests and offline runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use docqa_core::{ChatModel, ChatRequest, Error, ModelOutput, Result, ToolCallRequest};
use tokio::sync::Mutex;

type Handler = Box<dyn Fn(&ChatRequest) -> Result<ModelOutput> + Send + Sync>;

/// A [`ChatModel`] that replays scripted outputs.
///
/// Each call pops the next scripted output. Once the script is exhausted the
/// handler (if any) answers; otherwise the call fails with
/// [`Error::Generation`]. Every request is recorded for inspection.
///
/// # Example
///
/// ```rust,ignore
/// let model = MockChatModel::new("mock")
///     .with_tool_call("docs_search", "tracing")
///     .with_text("LangSmith traces runs.");
/// ```
pub struct MockChatModel {
    name: String,
    script: Mutex<VecDeque<Result<ModelOutput>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            handler: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue an output.
    pub fn with_output(self, output: ModelOutput) -> Self {
        self.with_result(Ok(output))
    }

    /// Queue a final text answer.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_output(ModelOutput::Text(text.into()))
    }

    /// Queue a tool call. Call ids are numbered by queue position.
    pub fn with_tool_call(
        mut self,
        tool_name: impl Into<String>,
        tool_input: impl Into<String>,
    ) -> Self {
        let id = format!("call_{}", self.script.get_mut().len());
        self.with_output(ModelOutput::ToolCall(ToolCallRequest::new(id, tool_name, tool_input)))
    }

    /// Queue a generation failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        let error = Error::generation(self.name.clone(), message);
        self.with_result(Err(error))
    }

    /// Answer with `handler` once the script is exhausted.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<ModelOutput> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    fn with_result(mut self, result: Result<ModelOutput>) -> Self {
        self.script.get_mut().push_back(result);
        self
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ModelOutput> {
        self.requests.lock().await.push(request.clone());

        if let Some(scripted) = self.script.lock().await.pop_front() {
            return scripted;
        }

        match &self.handler {
            Some(handler) => handler(&request),
            None => Err(Error::generation(&self.name, "no scripted response left")),
        }
    }
}
