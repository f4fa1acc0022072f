//! # docqa-core
//!
//! Core traits and types shared by the docqa crates.
//!
//! ## Overview
//!
//! - [`ChatModel`] - chat completion backend returning text or a tool call
//! - [`Tool`] / [`ToolRegistry`] - named capabilities the agent can invoke
//! - [`ChatMessage`], [`ConversationTurn`], [`ChatHistory`] - conversation types
//! - [`Error`] - the error taxonomy used across the workspace
//! - [`cancellable`] - abort a stage when a [`CancellationToken`] fires

pub mod cancel;
pub mod error;
pub mod message;
pub mod model;
pub mod tool;

pub use cancel::{CancellationToken, cancellable};
pub use error::{Error, Result};
pub use message::{ChatHistory, ChatMessage, ConversationTurn, Role, Speaker, ToolCallRequest};
pub use model::{ChatModel, ChatRequest, ModelOutput, ToolSpec};
pub use tool::{Tool, ToolRegistry};
