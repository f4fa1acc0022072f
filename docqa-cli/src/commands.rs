//! Subcommand runners.

use std::io::Write;

use anyhow::Context;
use docqa_agent::{AgentOutcome, DirectChat, RagAnswer};
use docqa_core::ChatHistory;
use docqa_rag::IngestReport;
use docqa_rag::document::SOURCE_KEY;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};

use crate::app::App;
use crate::settings::Command;

const PROMPT: &str = "You > ";

pub async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Chat { input } => chat(app, &input).await,
        Command::Load { json } => load(app, json).await,
        Command::Ask { question, json } => ask(app, &question, json).await,
        Command::Converse => converse(app).await,
        Command::Agent { question } => agent(app, &question).await,
    }
}

async fn chat(app: &App, input: &str) -> anyhow::Result<()> {
    let chat = DirectChat::new(app.chat_model()?).with_temperature(app.settings().temperature);
    let answer = chat.invoke(input, app.cancel()).await?;
    println!("{answer}");
    Ok(())
}

async fn load(app: &App, json: bool) -> anyhow::Result<()> {
    let (_, ingested) = app.ingest().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ingested.report)?);
    } else {
        print!("{}", format_report(&ingested.report));
    }
    Ok(())
}

async fn ask(app: &App, question: &str, json: bool) -> anyhow::Result<()> {
    let model = app.chat_model()?;
    let (pipeline, ingested) = app.ingest().await?;
    let chain = app.retrieval_chain(model, pipeline.retriever(ingested.index));

    let answer = chain.ask(question, app.cancel()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.answer);
        print!("{}", format_sources(&answer));
    }
    Ok(())
}

async fn converse(app: &App) -> anyhow::Result<()> {
    let model = app.chat_model()?;
    let (pipeline, ingested) = app.ingest().await?;
    let chain = app.conversational_chain(model, pipeline.retriever(ingested.index));

    println!("Loaded {}. Ask away; Ctrl-D to quit.", app.settings().url);
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    let mut history = ChatHistory::new();

    loop {
        // Reading stdin blocks this worker thread; requires the multi-thread runtime.
        let line = tokio::task::block_in_place(|| editor.readline(PROMPT));
        let input = match line {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(input) {
            warn!(error = %e, "failed to record line history");
        }

        match chain.ask(&history, input, app.cancel()).await {
            Ok(answer) => {
                println!("{}\n", answer.answer);
                history.push_exchange(input, answer.answer);
            }
            Err(e) if e.is_cancelled() => {
                warn!("cancelled");
                break;
            }
            Err(e) => eprintln!("error: {e}"),
        }
        std::io::stdout().flush()?;
    }

    info!(turns = history.len(), "conversation ended");
    Ok(())
}

async fn agent(app: &App, question: &str) -> anyhow::Result<()> {
    let model = app.chat_model()?;
    let (pipeline, ingested) = app.ingest().await?;
    let tools = app.agent_tools(pipeline.retriever(ingested.index))?;
    let agent = app.agent(model, tools);

    let run = agent.run(&ChatHistory::new(), question, app.cancel()).await?;
    for entry in &run.scratchpad {
        info!(tool = %entry.call.tool_name, input = %entry.call.tool_input, "tool used");
    }
    match run.outcome {
        AgentOutcome::Answer { text } => {
            println!("{text}");
            Ok(())
        }
        AgentOutcome::Failed(reason) => Err(docqa_core::Error::from(reason).into()),
    }
}

pub fn format_report(report: &IngestReport) -> String {
    let mut out = format!(
        "Loaded {} document(s), {} characters\nSplit into {} segment(s)\n",
        report.document_count, report.content_length, report.segment_count
    );
    if let Some(len) = report.first_segment_length {
        out.push_str(&format!("First segment: {len} characters\n"));
    }
    out
}

pub fn format_sources(answer: &RagAnswer) -> String {
    if answer.sources.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nSources:\n");
    for (rank, result) in answer.sources.iter().enumerate() {
        let source = result
            .segment
            .metadata
            .get(SOURCE_KEY)
            .map(String::as_str)
            .unwrap_or(&result.segment.document_id);
        out.push_str(&format!(
            "  {}. {} @{} (score {:.3})\n",
            rank + 1,
            source,
            result.segment.start_index,
            result.score
        ));
    }
    out
}
