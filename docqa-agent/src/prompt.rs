//! Typed prompt templates.
//!
//! Each template is a function from a context struct to the message list
//! sent to the chat model. History always sits between the system message
//! and the new user input.

use docqa_core::{ChatHistory, ChatMessage};
use docqa_rag::Segment;

use crate::agent::ScratchpadEntry;

/// System prompt for [`DirectChat`](crate::DirectChat).
pub const DOC_WRITER_PERSONA: &str =
    "You are a world class technical documentation writer with relevant knowledge on technology.";

/// Final instruction asking the model for a standalone search query.
pub const REWRITE_INSTRUCTION: &str = "Given the above conversation, generate a search query to look up in order to get information relevant to the conversation";

/// Prefix of the answer system prompt; the retrieved context follows it.
pub const ANSWER_INSTRUCTION: &str = "Answer the user's questions based on the below context:";

/// Default system prompt for the agent loop.
pub const DEFAULT_AGENT_INSTRUCTION: &str = "You are a helpful assistant. Use the available tools when they help answer the question, then reply with a final answer.";

/// Separator between retrieved segments in the answer context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

pub struct DirectContext<'a> {
    pub input: &'a str,
}

pub struct RewriteContext<'a> {
    pub history: &'a ChatHistory,
    pub input: &'a str,
}

pub struct AnswerContext<'a> {
    pub segments: &'a [Segment],
    pub history: &'a ChatHistory,
    pub input: &'a str,
}

pub struct AgentContext<'a> {
    pub system: &'a str,
    pub history: &'a ChatHistory,
    pub input: &'a str,
    pub scratchpad: &'a [ScratchpadEntry],
}

fn history_messages(history: &ChatHistory) -> impl Iterator<Item = ChatMessage> + '_ {
    history.turns().iter().map(ChatMessage::from)
}

pub fn direct_messages(ctx: &DirectContext<'_>) -> Vec<ChatMessage> {
    vec![ChatMessage::system(DOC_WRITER_PERSONA), ChatMessage::user(ctx.input)]
}

/// History, the new input, then the rewrite instruction as a final user turn.
pub fn rewrite_messages(ctx: &RewriteContext<'_>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history_messages(ctx.history).collect();
    messages.push(ChatMessage::user(ctx.input));
    messages.push(ChatMessage::user(REWRITE_INSTRUCTION));
    messages
}

/// Joins segment contents into the context block of the answer prompt.
pub fn format_context(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.content.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

pub fn answer_messages(ctx: &AnswerContext<'_>) -> Vec<ChatMessage> {
    let system = format!("{ANSWER_INSTRUCTION}\n\n{}", format_context(ctx.segments));
    let mut messages = vec![ChatMessage::system(system)];
    messages.extend(history_messages(ctx.history));
    messages.push(ChatMessage::user(ctx.input));
    messages
}

/// System, history, input, then one assistant tool call and one tool result
/// per scratchpad entry.
pub fn agent_messages(ctx: &AgentContext<'_>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(ctx.system)];
    messages.extend(history_messages(ctx.history));
    messages.push(ChatMessage::user(ctx.input));
    for entry in ctx.scratchpad {
        messages.push(ChatMessage::assistant_tool_call(entry.call.clone()));
        messages.push(ChatMessage::tool_result(&entry.call.id, &entry.observation));
    }
    messages
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use docqa_core::{Role, ToolCallRequest};

    use super::*;

    fn segment(content: &str) -> Segment {
        Segment {
            id: "doc_0".to_string(),
            document_id: "doc".to_string(),
            content: content.to_string(),
            start_index: 0,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn rewrite_prompt_ends_with_instruction() {
        let mut history = ChatHistory::new();
        history.push_exchange("Can LangSmith help test my LLM applications?", "Yes!");

        let messages = rewrite_messages(&RewriteContext { history: &history, input: "Tell me how" });
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::User]);
        assert_eq!(messages[2].content, "Tell me how");
        assert_eq!(messages[3].content, REWRITE_INSTRUCTION);
    }

    #[test]
    fn answer_prompt_embeds_context_in_system_message() {
        let segments = vec![segment("first"), segment("second")];
        let history = ChatHistory::new();
        let messages =
            answer_messages(&AnswerContext { segments: &segments, history: &history, input: "q" });

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.ends_with("context:\n\nfirst\n\nsecond"));
        assert_eq!(messages[1].content, "q");
    }

    #[test]
    fn agent_prompt_replays_scratchpad() {
        let history = ChatHistory::new();
        let scratchpad = vec![ScratchpadEntry {
            call: ToolCallRequest::new("call_0", "docs_search", "tracing"),
            observation: "LangSmith traces runs.".to_string(),
        }];
        let messages = agent_messages(&AgentContext {
            system: DEFAULT_AGENT_INSTRUCTION,
            history: &history,
            input: "How does tracing work?",
            scratchpad: &scratchpad,
        });

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].tool_call.as_ref().unwrap().tool_name, "docs_search");
        assert_eq!(messages[3].role, Role::Tool);
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("call_0"));
    }
}
