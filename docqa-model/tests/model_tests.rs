use docqa_core::{ChatMessage, ChatModel, ChatRequest, Error, ModelOutput};
use docqa_model::{MockChatModel, OpenAIChatModel, OpenAIConfig};

#[test]
fn test_openai_model_creation() {
    let model = OpenAIChatModel::new(OpenAIConfig::new("sk-test", "gpt-4o-mini")).unwrap();
    assert_eq!(model.name(), "gpt-4o-mini");
}

#[test]
fn test_openai_model_requires_key() {
    let result = OpenAIChatModel::new(OpenAIConfig::new("", "gpt-4o-mini"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_compatible_model_uses_base_url() {
    let model =
        OpenAIChatModel::compatible("ollama", "http://localhost:11434/v1", "llama3.1").unwrap();
    assert_eq!(model.name(), "llama3.1");
    assert_eq!(model.config().api_base(), "http://localhost:11434/v1");
}

#[tokio::test]
async fn test_mock_replays_script_in_order() {
    let model = MockChatModel::new("mock")
        .with_tool_call("docs_search", "tracing")
        .with_text("LangSmith traces runs.");

    let request = ChatRequest::new(vec![ChatMessage::user("What does LangSmith do?")]);

    match model.complete(request.clone()).await.unwrap() {
        ModelOutput::ToolCall(call) => {
            assert_eq!(call.id, "call_0");
            assert_eq!(call.tool_name, "docs_search");
            assert_eq!(call.tool_input, "tracing");
        }
        other => panic!("expected tool call, got {other:?}"),
    }
    assert_eq!(
        model.complete(request.clone()).await.unwrap(),
        ModelOutput::Text("LangSmith traces runs.".to_string())
    );

    let err = model.complete(request).await.unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
    assert_eq!(model.call_count().await, 3);
}

#[tokio::test]
async fn test_mock_handler_sees_request() {
    let model = MockChatModel::new("echo").with_handler(|request| {
        let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(ModelOutput::Text(format!("echo: {last}")))
    });

    let output = model
        .complete(ChatRequest::new(vec![ChatMessage::user("hello")]).with_temperature(0.0))
        .await
        .unwrap();
    assert_eq!(output.into_text().as_deref(), Some("echo: hello"));

    let requests = model.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].temperature, Some(0.0));
}

#[tokio::test]
async fn test_mock_scripted_error() {
    let model = MockChatModel::new("mock").with_error("rate limited");
    let err = model.complete(ChatRequest::default()).await.unwrap_err();
    assert!(matches!(err, Error::Generation { ref model, .. } if model == "mock"));
}
