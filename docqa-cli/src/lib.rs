//! # docqa-cli
//!
//! The `docqa` binary: each subcommand runs one stage of the question
//! answering pipeline against a single web page.
//!
//! | command | what it does |
//! |---------|--------------|
//! | `chat` | ask the model directly |
//! | `load` | fetch, split and index the page; print statistics |
//! | `ask` | answer one question from the page |
//! | `converse` | follow-up questions with history |
//! | `agent` | let the model pick docs search or web search |

pub mod app;
pub mod commands;
pub mod settings;
pub mod telemetry;

pub use app::App;
pub use settings::{Cli, Command, EmbeddingBackend, Settings};
