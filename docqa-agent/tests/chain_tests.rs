//! Tests for query rewriting, answer generation and the retrieval chains.

use std::sync::Arc;

use docqa_agent::prompt::{DOC_WRITER_PERSONA, REWRITE_INSTRUCTION};
use docqa_agent::{AnswerGenerator, ConversationalRag, DirectChat, QueryRewriter, RetrievalChain};
use docqa_core::{
    CancellationToken, ChatHistory, ChatModel, ChatRequest, Error, ModelOutput, Role,
};
use docqa_model::MockChatModel;
use docqa_rag::{Document, HashEmbeddingProvider, IngestPipeline, RagConfig, Retriever};

const LANGSMITH: &str = "LangSmith helps trace and test LLM applications.";

async fn retriever() -> Retriever {
    let pipeline = IngestPipeline::builder()
        .config(RagConfig::builder().top_k(1).build().unwrap())
        .embedding_provider(Arc::new(HashEmbeddingProvider::default()))
        .build()
        .unwrap();
    let documents = vec![
        Document::new("guide", LANGSMITH),
        Document::new("fruit", "Bananas grow in bunches."),
        Document::new("city", "Paris sits on the Seine."),
    ];
    let ingested = pipeline.ingest_documents(&documents, &CancellationToken::new()).await.unwrap();
    pipeline.retriever(ingested.index)
}

/// Answers with the system message, which holds the retrieved context.
fn echo_context(request: &ChatRequest) -> docqa_core::Result<ModelOutput> {
    let system = request
        .messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    Ok(ModelOutput::Text(format!("Based on the docs: {system}")))
}

/// Answers with every user turn except the rewrite instruction.
fn echo_user_turns(request: &ChatRequest) -> docqa_core::Result<ModelOutput> {
    let turns: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::User && m.content != REWRITE_INSTRUCTION)
        .map(|m| m.content.as_str())
        .collect();
    Ok(ModelOutput::Text(turns.join(" ")))
}

fn follow_up_history() -> ChatHistory {
    let mut history = ChatHistory::new();
    history.push_exchange("Can LangSmith help test my LLM applications?", "Yes!");
    history
}

#[tokio::test]
async fn retrieval_chain_answers_from_context() {
    let model = Arc::new(MockChatModel::new("echo").with_handler(echo_context));
    let chain = RetrievalChain::new(retriever().await, AnswerGenerator::new(model.clone()));

    let answer = chain.ask("What is LangSmith used for?", &CancellationToken::new()).await.unwrap();

    assert_eq!(answer.sources.len(), 1);
    assert!(answer.sources[0].segment.content.contains("trace and test"));
    assert!(answer.answer.contains("trace and test"));
    assert_eq!(answer.query, "What is LangSmith used for?");
    assert_eq!(model.call_count().await, 1);
}

#[tokio::test]
async fn rewrite_with_empty_history_returns_input_without_model_call() {
    let model = Arc::new(MockChatModel::new("echo").with_handler(echo_user_turns));
    let rewriter = QueryRewriter::new(model.clone());

    let query = rewriter
        .rewrite(&ChatHistory::new(), "  What is LangSmith?  ", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(query, "  What is LangSmith?  ");
    assert_eq!(model.call_count().await, 0);
}

#[tokio::test]
async fn rewrite_uses_history() {
    let model = Arc::new(MockChatModel::new("echo").with_handler(echo_user_turns));
    let rewriter = QueryRewriter::new(model.clone()).with_temperature(0.0);

    let query =
        rewriter.rewrite(&follow_up_history(), "Tell me how", &CancellationToken::new()).await.unwrap();

    assert!(query.contains("test"));
    assert!(query.contains("applications"));

    let requests = model.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[0].messages.last().unwrap().content, REWRITE_INSTRUCTION);
}

#[tokio::test]
async fn rewrite_rejects_tool_calls() {
    let model = Arc::new(MockChatModel::new("mock").with_tool_call("docs_search", "x"));
    let err = QueryRewriter::new(model)
        .rewrite(&follow_up_history(), "Tell me how", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
}

#[tokio::test]
async fn conversational_chain_retrieves_with_rewritten_query() {
    let model = Arc::new(
        MockChatModel::new("mock")
            .with_text("LangSmith trace test applications")
            .with_handler(echo_context),
    );
    let chain = ConversationalRag::new(
        QueryRewriter::new(model.clone()),
        retriever().await,
        AnswerGenerator::new(model.clone()),
    );

    let history = follow_up_history();
    let answer = chain.ask(&history, "Tell me how", &CancellationToken::new()).await.unwrap();

    assert_eq!(answer.query, "LangSmith trace test applications");
    assert_eq!(answer.sources[0].segment.content, LANGSMITH);
    assert!(answer.answer.contains("trace and test"));

    let requests = model.requests().await;
    assert_eq!(requests.len(), 2);
    // The answer prompt carries the original input after the history.
    let answer_prompt = &requests[1].messages;
    assert_eq!(answer_prompt.len(), 4);
    assert_eq!(answer_prompt[1].content, "Can LangSmith help test my LLM applications?");
    assert_eq!(answer_prompt[3].content, "Tell me how");
}

#[tokio::test]
async fn generation_failure_propagates() {
    let model = Arc::new(MockChatModel::new("mock").with_error("service unavailable"));
    let chain = RetrievalChain::new(retriever().await, AnswerGenerator::new(model));

    let err = chain.ask("What is LangSmith used for?", &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
}

#[tokio::test]
async fn generator_rejects_tool_calls() {
    let model = Arc::new(MockChatModel::new("mock").with_tool_call("docs_search", "x"));
    let err = AnswerGenerator::new(model)
        .generate(&[], &ChatHistory::new(), "question", &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
}

#[tokio::test]
async fn generator_returns_text_verbatim() {
    let model = Arc::new(MockChatModel::new("mock").with_text("  spaced answer\n"));
    let answer = AnswerGenerator::new(model)
        .generate(&[], &ChatHistory::new(), "question", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(answer, "  spaced answer\n");
}

#[tokio::test]
async fn cancelled_chain_returns_cancelled() {
    let model = Arc::new(MockChatModel::new("echo").with_handler(echo_context));
    let chain = RetrievalChain::new(retriever().await, AnswerGenerator::new(model.clone()));

    let token = CancellationToken::new();
    token.cancel();
    let err = chain.ask("What is LangSmith used for?", &token).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(model.call_count().await, 0);
}

#[tokio::test]
async fn direct_chat_uses_persona() {
    let model = Arc::new(MockChatModel::new("mock").with_text("LangSmith is a platform."));
    let chat = DirectChat::new(model.clone()).with_temperature(0.7);

    let answer = chat.invoke("What is LangSmith?", &CancellationToken::new()).await.unwrap();
    assert_eq!(answer, "LangSmith is a platform.");

    let requests = model.requests().await;
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[0].content, DOC_WRITER_PERSONA);
    assert_eq!(requests[0].messages[1].content, "What is LangSmith?");
    assert_eq!(model.name(), "mock");
}
