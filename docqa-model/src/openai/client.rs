//! OpenAI client implementation.

use async_openai::Client;
use async_openai::config::OpenAIConfig as ClientConfig;
use async_trait::async_trait;
use docqa_core::{ChatModel, ChatRequest, Error, ModelOutput, Result};
use tracing::{debug, error};

use super::config::OpenAIConfig;
use super::convert;

/// OpenAI client for the standard OpenAI API and OpenAI-compatible APIs.
///
/// Sends one non-streaming chat completion request per call.
pub struct OpenAIChatModel {
    client: Client<ClientConfig>,
    config: OpenAIConfig,
}

impl OpenAIChatModel {
    /// Create a new OpenAI client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config("OpenAI API key must not be empty".to_string()));
        }

        let mut client_config =
            ClientConfig::new().with_api_key(&config.api_key).with_api_base(config.api_base());
        if let Some(org_id) = &config.organization_id {
            client_config = client_config.with_org_id(org_id);
        }

        Ok(Self { client: Client::with_config(client_config), config })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIConfig::compatible(api_key, base_url, model))
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<ModelOutput> {
        let model = self.config.model.as_str();
        let openai_request = convert::to_completion_request(model, &request)
            .map_err(|e| Error::generation(model, format!("failed to build request: {e}")))?;

        debug!(
            model,
            message_count = openai_request.messages.len(),
            tool_count = request.tools.len(),
            "sending chat completion request"
        );

        let response = self.client.chat().create(openai_request).await.map_err(|e| {
            error!(model, error = %e, "OpenAI API error");
            Error::generation(model, format!("OpenAI API error: {e}"))
        })?;

        let output = convert::from_completion_response(response)
            .ok_or_else(|| Error::generation(model, "response contained no message"))?;

        debug!(model, tool_call = matches!(output, ModelOutput::ToolCall(_)), "received completion");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(OpenAIChatModel::new(OpenAIConfig::new("", "gpt-4o-mini")), Err(Error::Config(_))));
    }

    #[test]
    fn compatible_client_keeps_model_and_base() {
        let model = OpenAIChatModel::compatible("ollama", "http://localhost:11434/v1/", "llama3.1").unwrap();
        assert_eq!(model.name(), "llama3.1");
        assert_eq!(model.config().api_base(), "http://localhost:11434/v1");
    }
}
