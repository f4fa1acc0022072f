//! Command-line and environment settings.
//!
//! Every option falls back to an environment variable, and `main` loads a
//! `.env` file before parsing, so a checked-out `.env` is enough to run.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use docqa_agent::AgentConfig;
use docqa_core::{Error, Result};
use docqa_model::OpenAIConfig;
use docqa_rag::RagConfig;

pub const DEFAULT_URL: &str = "https://docs.smith.langchain.com/user_guide";

#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Ask questions about a documentation page",
    long_about = None
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Ask the chat model directly, without retrieval
    Chat {
        /// The question
        input: String,
    },

    /// Load and index the page, then print ingestion statistics
    Load {
        /// Output the report as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Answer one question from the loaded page
    Ask {
        /// The question
        question: String,

        /// Output the answer and its sources as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Interactive follow-up questions over the loaded page
    Converse,

    /// Let the agent choose between the docs search and web search tools
    Agent {
        /// The question
        question: String,
    },
}

/// Which embedding backend indexes the page.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint
    Openai,
    /// Offline feature hashing; no API key needed
    Hashing,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Settings {
    /// API key for the OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "DOCQA_CHAT_MODEL", default_value = "gpt-4o-mini", global = true)]
    pub chat_model: String,

    #[arg(
        long,
        env = "DOCQA_EMBEDDING_MODEL",
        default_value = "text-embedding-3-small",
        global = true
    )]
    pub embedding_model: String,

    #[arg(long, value_enum, env = "DOCQA_EMBEDDINGS", default_value_t = EmbeddingBackend::Openai, global = true)]
    pub embeddings: EmbeddingBackend,

    #[arg(long, env = "DOCQA_TEMPERATURE", default_value_t = 0.7, global = true)]
    pub temperature: f32,

    #[arg(long, env = "DOCQA_CHUNK_SIZE", default_value_t = 1000, global = true)]
    pub chunk_size: usize,

    #[arg(long, env = "DOCQA_CHUNK_OVERLAP", default_value_t = 200, global = true)]
    pub chunk_overlap: usize,

    #[arg(long, env = "DOCQA_TOP_K", default_value_t = 4, global = true)]
    pub top_k: usize,

    /// Maximum model calls per agent run; 0 removes the cap
    #[arg(long, env = "DOCQA_MAX_ITERATIONS", default_value_t = 10, global = true)]
    pub max_iterations: usize,

    /// The page to load
    #[arg(long, env = "DOCQA_URL", default_value = DEFAULT_URL, global = true)]
    pub url: String,

    /// CSS selector for the page content
    #[arg(long, env = "DOCQA_SELECTOR", default_value = "body", global = true)]
    pub selector: String,

    /// Enables the web search tool for `docqa agent`
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true, global = true)]
    pub tavily_api_key: Option<String>,
}

impl Settings {
    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .build()
    }

    pub fn agent_config(&self) -> AgentConfig {
        let config = AgentConfig::default().with_temperature(self.temperature);
        match self.max_iterations {
            0 => config,
            max => config.with_max_iterations(max),
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::Config`] if no API key is set.
    pub fn openai_config(&self) -> Result<OpenAIConfig> {
        let api_key = self.api_key()?;
        Ok(match self.openai_base_url.as_deref().filter(|url| !url.is_empty()) {
            Some(base_url) => OpenAIConfig::compatible(api_key, base_url, &self.chat_model),
            None => OpenAIConfig::new(api_key, &self.chat_model),
        })
    }

    pub fn api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))
    }

    pub fn tavily_key(&self) -> Option<&str> {
        self.tavily_api_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_subcommands() {
        let cli = parse(&["docqa", "ask", "What is LangSmith?", "--json"]);
        assert_eq!(
            cli.command,
            Command::Ask { question: "What is LangSmith?".to_string(), json: true }
        );

        let cli = parse(&["docqa", "-vv", "converse"]);
        assert_eq!(cli.command, Command::Converse);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = parse(&["docqa", "load", "--embeddings", "hashing", "--chunk-size", "500", "--top-k", "2"]);
        assert_eq!(cli.settings.embeddings, EmbeddingBackend::Hashing);

        let config = cli.settings.rag_config().unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.top_k, 2);
    }

    #[test]
    fn invalid_chunking_is_a_config_error() {
        let cli = parse(&["docqa", "load", "--chunk-size", "100", "--chunk-overlap", "100"]);
        assert!(matches!(cli.settings.rag_config(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_iterations_removes_the_cap() {
        let cli = parse(&["docqa", "agent", "hi", "--max-iterations", "0"]);
        assert_eq!(cli.settings.agent_config().max_iterations, None);

        let cli = parse(&["docqa", "agent", "hi", "--max-iterations", "3"]);
        assert_eq!(cli.settings.agent_config().max_iterations, Some(3));
    }

    #[test]
    fn base_url_selects_compatible_config() {
        let cli = parse(&[
            "docqa",
            "chat",
            "hi",
            "--openai-api-key",
            "sk-test",
            "--openai-base-url",
            "http://localhost:11434/v1",
            "--chat-model",
            "llama3",
        ]);
        let config = cli.settings.openai_config().unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.api_base(), "http://localhost:11434/v1");
    }
}
