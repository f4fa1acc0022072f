use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use docqa_agent::RagAnswer;
use docqa_cli::commands::{format_report, format_sources};
use docqa_cli::{App, Cli};
use docqa_core::{CancellationToken, ChatHistory};
use docqa_model::MockChatModel;
use docqa_rag::{Document, IngestReport, SearchResult, Segment};

fn app(args: &[&str]) -> App {
    App::new(Cli::try_parse_from(args).unwrap().settings, CancellationToken::new())
}

#[test]
fn report_lists_ingestion_statistics() {
    let report = IngestReport {
        document_count: 1,
        content_length: 4812,
        segment_count: 6,
        first_segment_length: Some(996),
    };
    let text = format_report(&report);
    assert!(text.contains("1 document(s), 4812 characters"));
    assert!(text.contains("6 segment(s)"));
    assert!(text.contains("First segment: 996 characters"));

    let empty = IngestReport { first_segment_length: None, segment_count: 0, ..report };
    assert!(!format_report(&empty).contains("First segment"));
}

#[test]
fn sources_prefer_the_page_url() {
    let segment = Segment {
        id: "guide#0".to_string(),
        document_id: "guide".to_string(),
        content: "LangSmith helps trace and test LLM applications.".to_string(),
        start_index: 0,
        metadata: HashMap::from([("source".to_string(), "https://docs.example.com".to_string())]),
    };
    let answer = RagAnswer {
        answer: "It traces.".to_string(),
        query: "What is LangSmith?".to_string(),
        sources: vec![SearchResult { segment, score: 0.5 }],
    };

    let text = format_sources(&answer);
    assert!(text.contains("1. https://docs.example.com @0 (score 0.500)"));

    let none = RagAnswer { sources: Vec::new(), ..answer };
    assert!(format_sources(&none).is_empty());
}

#[tokio::test]
async fn conversational_chain_from_settings_answers_offline() {
    let app = app(&["docqa", "converse", "--embeddings", "hashing", "--top-k", "1"]);
    let pipeline = app.pipeline().unwrap();
    let documents = vec![
        Document::new("guide", "LangSmith helps trace and test LLM applications."),
        Document::new("fruit", "Bananas grow in bunches."),
    ];
    let ingested = pipeline.ingest_documents(&documents, app.cancel()).await.unwrap();

    let model = Arc::new(
        MockChatModel::new("mock")
            .with_text("LangSmith trace")
            .with_text("It traces and tests LLM applications."),
    );
    let chain = app.conversational_chain(model.clone(), pipeline.retriever(ingested.index));

    let mut history = ChatHistory::new();
    history.push_exchange("What is LangSmith?", "A platform.");
    let answer = chain.ask(&history, "What does it do?", app.cancel()).await.unwrap();

    assert_eq!(answer.query, "LangSmith trace");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].segment.document_id, "guide");
    assert_eq!(answer.answer, "It traces and tests LLM applications.");
    let requests = model.requests().await;
    assert_eq!(requests[0].temperature, Some(0.7));
    assert_eq!(requests[1].temperature, Some(0.7));
}
