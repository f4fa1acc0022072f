//! # docqa-model
//!
//! Chat model integrations for docqa.
//!
//! ## Overview
//!
//! - [`OpenAIChatModel`] - OpenAI chat completions, or any OpenAI-compatible server
//! - [`MockChatModel`] - scripted model for tests and offline runs
//!
//! Both implement [`docqa_core::ChatModel`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docqa_model::openai::{OpenAIChatModel, OpenAIConfig};
//!
//! let model = OpenAIChatModel::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY")?,
//!     "gpt-4o-mini",
//! ))?;
//! ```

pub mod mock;
pub mod openai;

pub use mock::MockChatModel;
pub use openai::{OpenAIChatModel, OpenAIConfig};
