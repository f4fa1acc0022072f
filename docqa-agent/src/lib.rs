//! # docqa-agent
//!
//! Answering questions over an indexed document.
//!
//! ## Overview
//!
//! - [`DirectChat`] - plain chat under a documentation-writer persona
//! - [`RetrievalChain`] - retrieve, then answer from the retrieved context
//! - [`ConversationalRag`] - rewrite a follow-up with [`QueryRewriter`], retrieve, answer
//! - [`AgentExecutor`] - let the model pick between registered tools until it answers
//! - [`TavilySearchTool`] - web search for the agent
//!
//! Prompts live in [`prompt`] as typed templates.

pub mod agent;
pub mod chain;
pub mod generator;
pub mod prompt;
pub mod rewriter;
pub mod search;

pub use agent::{
    AgentConfig, AgentExecutor, AgentOutcome, AgentRun, AgentState, FailureReason, ScratchpadEntry,
};
pub use chain::{ConversationalRag, DirectChat, RagAnswer, RetrievalChain};
pub use generator::AnswerGenerator;
pub use rewriter::QueryRewriter;
pub use search::{TavilySearchTool, WebResult};
