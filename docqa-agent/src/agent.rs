//! Tool-dispatching agent loop.
//!
//! The executor alternates between asking the model for its next step and
//! running the tool it picked, until the model answers in text. Dispatch is
//! over a closed [`ToolRegistry`]; naming any other tool fails the run.
//!
//! ```text
//!                 ┌──────── tool output ────────┐
//!                 ▼                             │
//!   start ─► AwaitingModel ── tool call ─► ExecutingTool
//!                 │
//!                 ├── text ──────────────► Done
//!                 └── unknown tool / cap ─► Failed
//! ```
//!
//! Tool failures other than cancellation become observations and the loop
//! continues. Model failures and cancellation end the run with an error.

use std::sync::Arc;

use docqa_core::{
    CancellationToken, ChatHistory, ChatModel, ChatRequest, Error, ModelOutput, Result,
    ToolCallRequest, ToolRegistry, ToolSpec, cancellable,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::prompt::{AgentContext, DEFAULT_AGENT_INSTRUCTION, agent_messages};

/// Agent loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub system_prompt: String,
    pub temperature: Option<f32>,
    /// Maximum number of model calls per run. `None` means no cap.
    pub max_iterations: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_AGENT_INSTRUCTION.to_string(),
            temperature: None,
            max_iterations: None,
        }
    }
}

impl AgentConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Where the loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    AwaitingModel,
    ExecutingTool,
    Done,
    Failed,
}

/// Why a run ended in [`AgentState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The model named a tool that is not registered.
    UnknownTool { name: String },
    /// The model was called `max_iterations` times without a final answer.
    IterationLimit { max_iterations: usize },
}

impl From<FailureReason> for Error {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::UnknownTool { name } => Error::UnknownTool(name),
            FailureReason::IterationLimit { max_iterations } => {
                Error::AgentIterationExceeded { max_iterations }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AgentOutcome {
    Answer { text: String },
    Failed(FailureReason),
}

/// One tool call and what it returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScratchpadEntry {
    pub call: ToolCallRequest,
    pub observation: String,
}

/// The result of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub outcome: AgentOutcome,
    pub scratchpad: Vec<ScratchpadEntry>,
    /// Number of model calls made.
    pub iterations: usize,
}

impl AgentRun {
    /// The terminal state: [`AgentState::Done`] or [`AgentState::Failed`].
    pub fn state(&self) -> AgentState {
        match self.outcome {
            AgentOutcome::Answer { .. } => AgentState::Done,
            AgentOutcome::Failed(_) => AgentState::Failed,
        }
    }

    /// The final answer, or the failure as an [`Error`].
    pub fn into_answer(self) -> Result<String> {
        match self.outcome {
            AgentOutcome::Answer { text } => Ok(text),
            AgentOutcome::Failed(reason) => Err(reason.into()),
        }
    }
}

enum Step {
    AwaitingModel,
    ExecutingTool(ToolCallRequest),
    Done(String),
    Failed(FailureReason),
}

impl Step {
    fn state(&self) -> AgentState {
        match self {
            Self::AwaitingModel => AgentState::AwaitingModel,
            Self::ExecutingTool(_) => AgentState::ExecutingTool,
            Self::Done(_) => AgentState::Done,
            Self::Failed(_) => AgentState::Failed,
        }
    }
}

/// Runs the agent loop over a chat model and a fixed set of tools.
///
/// # Example
///
/// ```rust,ignore
/// let tools = ToolRegistry::new()
///     .with_tool(Arc::new(RetrieverTool::new(retriever)))?
///     .with_tool(Arc::new(TavilySearchTool::new(api_key)))?;
/// let agent = AgentExecutor::new(model, tools, AgentConfig::default().with_max_iterations(10));
///
/// let answer = agent.invoke(&history, "How can LangSmith help with testing?", &token).await?;
/// ```
pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self { model, tools, config }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run the loop to a terminal state.
    ///
    /// An unknown tool or the iteration cap ends the run in
    /// [`AgentState::Failed`], reported through [`AgentRun::outcome`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the model fails and
    /// [`Error::Cancelled`] if `cancel` fires.
    #[instrument(skip_all, fields(model = self.model.name(), tool_count = self.tools.len()))]
    pub async fn run(
        &self,
        history: &ChatHistory,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRun> {
        let tool_specs = self.tools.specs();
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();
        let mut iterations = 0;
        let mut step = Step::AwaitingModel;

        loop {
            debug!(state = ?step.state(), iterations, "agent step");

            step = match step {
                Step::AwaitingModel => match self.config.max_iterations {
                    Some(max_iterations) if iterations >= max_iterations => {
                        Step::Failed(FailureReason::IterationLimit { max_iterations })
                    }
                    _ => {
                        iterations += 1;
                        self.next_step(&tool_specs, history, input, &scratchpad, cancel).await?
                    }
                },

                Step::ExecutingTool(call) => {
                    let observation = self.execute_tool(&call, cancel).await?;
                    scratchpad.push(ScratchpadEntry { call, observation });
                    Step::AwaitingModel
                }

                Step::Done(text) => {
                    info!(iterations, tool_calls = scratchpad.len(), "agent finished");
                    return Ok(AgentRun {
                        outcome: AgentOutcome::Answer { text },
                        scratchpad,
                        iterations,
                    });
                }

                Step::Failed(reason) => {
                    warn!(iterations, ?reason, "agent failed");
                    return Ok(AgentRun { outcome: AgentOutcome::Failed(reason), scratchpad, iterations });
                }
            };
        }
    }

    /// Ask the model for its next move.
    async fn next_step(
        &self,
        tool_specs: &[ToolSpec],
        history: &ChatHistory,
        input: &str,
        scratchpad: &[ScratchpadEntry],
        cancel: &CancellationToken,
    ) -> Result<Step> {
        let messages = agent_messages(&AgentContext {
            system: &self.config.system_prompt,
            history,
            input,
            scratchpad,
        });
        let mut request = ChatRequest::new(messages).with_tools(tool_specs.to_vec());
        request.temperature = self.config.temperature;

        Ok(match cancellable(cancel, self.model.complete(request)).await? {
            ModelOutput::Text(text) => Step::Done(text),
            ModelOutput::ToolCall(call) if self.tools.contains(&call.tool_name) => {
                Step::ExecutingTool(call)
            }
            ModelOutput::ToolCall(call) => {
                Step::Failed(FailureReason::UnknownTool { name: call.tool_name })
            }
        })
    }

    /// Run the loop and return only the final answer.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`run`](Self::run), returns
    /// [`Error::UnknownTool`] or [`Error::AgentIterationExceeded`] for a failed run.
    pub async fn invoke(
        &self,
        history: &ChatHistory,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.run(history, input, cancel).await?.into_answer()
    }

    /// Run one registered tool. Failures other than cancellation become the observation.
    async fn execute_tool(&self, call: &ToolCallRequest, cancel: &CancellationToken) -> Result<String> {
        let Some(tool) = self.tools.get(&call.tool_name) else {
            return Err(Error::UnknownTool(call.tool_name.clone()));
        };

        debug!(tool = %call.tool_name, input = %call.tool_input, "invoking tool");
        match cancellable(cancel, tool.invoke(&call.tool_input)).await {
            Ok(output) => Ok(output),
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => {
                warn!(tool = %call.tool_name, error = %e, "tool failed; returning error as observation");
                Ok(format!("Error: {e}"))
            }
        }
    }
}
