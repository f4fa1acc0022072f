use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docqa_core::{
    CancellationToken, ChatHistory, ChatMessage, Error, Role, Speaker, Tool, ToolRegistry,
    cancellable,
};

struct UpperTool;

#[async_trait]
impl Tool for UpperTool {
    fn name(&self) -> &str {
        "upper"
    }

    fn description(&self) -> &str {
        "Uppercase the input"
    }

    async fn invoke(&self, input: &str) -> docqa_core::Result<String> {
        Ok(input.to_uppercase())
    }
}

struct NamedTool(&'static str);

#[async_trait]
impl Tool for NamedTool {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "test tool"
    }

    async fn invoke(&self, _input: &str) -> docqa_core::Result<String> {
        Ok(String::new())
    }
}

#[tokio::test]
async fn registry_dispatches_by_name() {
    let registry = ToolRegistry::new().with_tool(Arc::new(UpperTool)).unwrap();

    let tool = registry.get("upper").expect("tool registered");
    assert_eq!(tool.invoke("trace").await.unwrap(), "TRACE");
    assert!(registry.get("lower").is_none());
    assert!(!registry.contains("lower"));
}

#[test]
fn registry_rejects_duplicate_names() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(UpperTool)).unwrap();

    let err = registry.register(Arc::new(UpperTool)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn registry_specs_keep_registration_order() {
    let registry = ToolRegistry::new()
        .with_tool(Arc::new(NamedTool("zeta")))
        .unwrap()
        .with_tool(Arc::new(NamedTool("alpha")))
        .unwrap();

    let names: Vec<_> = registry.specs().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

    let spec = &registry.specs()[0];
    assert_eq!(spec.parameters["required"][0], "input");
}

#[test]
fn history_turns_convert_to_chat_messages() {
    let mut history = ChatHistory::new();
    history.push_exchange("Can LangSmith help test my LLM applications?", "Yes!");

    assert_eq!(history.len(), 2);
    assert_eq!(history.turns()[0].speaker, Speaker::User);

    let messages: Vec<ChatMessage> = history.turns().iter().map(ChatMessage::from).collect();
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Yes!");
}

#[tokio::test]
async fn cancellable_passes_result_through() {
    let token = CancellationToken::new();
    let value = cancellable(&token, async { Ok(42) }).await.unwrap();
    assert_eq!(value, 42);
}

#[tokio::test]
async fn cancellable_reports_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let result = cancellable(&token, async { Ok(1) }).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn cancellable_aborts_pending_future() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result: docqa_core::Result<()> = cancellable(&token, async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    })
    .await;

    assert!(result.unwrap_err().is_cancelled());
}
