//! Conversion between docqa chat types and async-openai types.

use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse, FunctionCall, FunctionObjectArgs,
};
use docqa_core::{ChatMessage, ChatRequest, ModelOutput, Role, ToolCallRequest, ToolSpec};
use serde_json::{Value, json};

/// Build a chat completion request for `model`.
///
/// The agent runs one tool per step, so parallel tool calls are disabled
/// whenever tools are offered.
pub(crate) fn to_completion_request(
    model: &str,
    request: &ChatRequest,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let messages = request.messages.iter().map(to_message).collect::<Result<Vec<_>, _>>()?;

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(model).messages(messages);

    if let Some(temperature) = request.temperature {
        builder.temperature(temperature);
    }
    if !request.tools.is_empty() {
        let tools = request.tools.iter().map(to_tool).collect::<Result<Vec<_>, _>>()?;
        builder.tools(tools).parallel_tool_calls(false);
    }

    builder.build()
}

pub(crate) fn to_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.clone();
    Ok(match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default().content(content).build()?.into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default().content(content).build()?.into(),
        Role::Assistant => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            match &message.tool_call {
                // Assistant tool-call messages carry no text.
                Some(call) if content.is_empty() => builder.tool_calls(vec![to_tool_call(call)]),
                Some(call) => builder.content(content).tool_calls(vec![to_tool_call(call)]),
                None => builder.content(content),
            };
            builder.build()?.into()
        }
        Role::Tool => ChatCompletionRequestToolMessageArgs::default()
            .content(content)
            .tool_call_id(message.tool_call_id.clone().unwrap_or_default())
            .build()?
            .into(),
    })
}

fn to_tool_call(call: &ToolCallRequest) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.tool_name.clone(),
            arguments: encode_arguments(&call.tool_input),
        },
    }
}

fn to_tool(spec: &ToolSpec) -> Result<ChatCompletionTool, OpenAIError> {
    let function = FunctionObjectArgs::default()
        .name(&spec.name)
        .description(&spec.description)
        .parameters(spec.parameters.clone())
        .build()?;
    ChatCompletionToolArgs::default().r#type(ChatCompletionToolType::Function).function(function).build()
}

/// Encode tool input as function arguments.
///
/// Input that is already a JSON object is sent as-is; anything else is
/// wrapped as `{"input": ...}`.
pub(crate) fn encode_arguments(tool_input: &str) -> String {
    match serde_json::from_str::<Value>(tool_input) {
        Ok(Value::Object(_)) => tool_input.to_string(),
        _ => json!({ "input": tool_input }).to_string(),
    }
}

/// Decode function arguments into tool input.
///
/// `{"input": "..."}` yields the inner string; other arguments are passed
/// through unchanged.
pub(crate) fn decode_arguments(arguments: &str) -> String {
    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) if map.len() == 1 => match map.get("input") {
            Some(Value::String(input)) => input.clone(),
            _ => arguments.to_string(),
        },
        Ok(Value::String(input)) => input,
        _ => arguments.to_string(),
    }
}

/// Turn the first choice into a [`ModelOutput`].
///
/// A tool call wins over text; only the first tool call is used. Returns
/// `None` if the response has no choices or the message is empty.
pub(crate) fn from_completion_response(response: CreateChatCompletionResponse) -> Option<ModelOutput> {
    let message = response.choices.into_iter().next()?.message;

    if let Some(call) = message.tool_calls.into_iter().flatten().next() {
        return Some(ModelOutput::ToolCall(ToolCallRequest::new(
            call.id,
            call.function.name,
            decode_arguments(&call.function.arguments),
        )));
    }

    message.content.map(ModelOutput::Text)
}
