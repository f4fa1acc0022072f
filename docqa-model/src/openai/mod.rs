//! OpenAI provider implementation.
//!
//! Works with the hosted OpenAI API and any server exposing an
//! OpenAI-compatible `/chat/completions` endpoint (Ollama, vLLM, LM Studio).
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_model::openai::{OpenAIChatModel, OpenAIConfig};
//!
//! let model = OpenAIChatModel::new(OpenAIConfig::from_env("gpt-4o-mini")?)?;
//!
//! let local = OpenAIChatModel::compatible("ollama", "http://localhost:11434/v1", "llama3.1")?;
//! ```
//!
//! # Tool calling
//!
//! Registered tools are sent as functions with `parallel_tool_calls` disabled.
//! A `{"input": "..."}` argument object is unwrapped to the plain input
//! string; any other arguments reach the tool as raw JSON.

mod client;
mod config;
mod convert;

pub use client::OpenAIChatModel;
pub use config::{OPENAI_API_BASE, OpenAIConfig};
