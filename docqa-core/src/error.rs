//! Error types shared by every docqa crate.

use thiserror::Error;

/// Errors that can occur while loading, indexing, retrieving or generating.
#[derive(Debug, Error)]
pub enum Error {
    /// A document could not be fetched or parsed.
    #[error("Fetch error ({url}): {message}")]
    Fetch {
        /// The URL that was being loaded.
        url: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query was issued against an index holding no segments.
    #[error("Index is empty: nothing to retrieve")]
    EmptyIndex,

    /// The chat model failed to produce a completion.
    #[error("Generation error ({model}): {message}")]
    Generation {
        /// The chat model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A tool failed while handling a call.
    ///
    /// Inside the agent loop this is turned into an observation for the
    /// model instead of being returned to the caller.
    #[error("Tool error ({tool}): {message}")]
    ToolInvocation {
        /// The tool that failed.
        tool: String,
        /// A description of the failure.
        message: String,
    },

    /// The model asked for a tool that was never registered.
    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    /// The agent loop hit its configured iteration cap.
    #[error("Agent stopped after {max_iterations} iterations without a final answer")]
    AgentIterationExceeded {
        /// The configured cap.
        max_iterations: usize,
    },

    /// The caller cancelled the running stage.
    #[error("Operation cancelled")]
    Cancelled,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new [`Error::Embedding`].
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Embedding { provider: provider.into(), message: message.into() }
    }

    /// Create a new [`Error::Generation`].
    pub fn generation(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation { model: model.into(), message: message.into() }
    }

    /// Create a new [`Error::ToolInvocation`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolInvocation { tool: tool.into(), message: message.into() }
    }

    /// Create a new [`Error::Fetch`].
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch { url: url.into(), message: message.into() }
    }

    /// Whether this error means the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A convenience result type for docqa operations.
pub type Result<T> = std::result::Result<T, Error>;
