//! Chat model trait for completion backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::message::{ChatMessage, ToolCallRequest};

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments.
    pub parameters: Value,
}

/// Request for a single chat completion.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    /// Tools the model may call. Empty means plain completion.
    pub tools: Vec<ToolSpec>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// What the model produced: a final text or a request to run a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModelOutput {
    Text(String),
    ToolCall(ToolCallRequest),
}

impl ModelOutput {
    /// Return the text, or `None` for a tool call.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::ToolCall(_) => None,
        }
    }
}

/// A chat completion backend.
///
/// Implementations wrap a specific provider (OpenAI, OpenAI-compatible
/// servers, test doubles) behind one async call. Failures surface as
/// [`Error::Generation`](crate::Error::Generation).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    async fn complete(&self, request: ChatRequest) -> Result<ModelOutput>;
}
