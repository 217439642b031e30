//! Reasoning Loop
//!
//! Tool-use loop between the agent and the reasoning engine:
//!
//! ```text
//!   AwaitingModel ──tool requests──▶ ExecutingTools
//!        ▲                                 │
//!        └──────── results appended ───────┘
//!   AwaitingModel ──text only──▶ Done
//! ```
//!
//! Tool failures never abort the loop. They are appended as error results so
//! the model can decide what to do next. The number of model calls is capped
//! by [`AgentConfig::max_iterations`].

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{ContentBlock, Message};
use crate::provider::{GenerationOptions, LlmProvider, ModelResponse};
use crate::session::Session;
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum model calls per run before giving up
    pub max_iterations: usize,

    /// Generation options, including the system prompt
    pub generation: GenerationOptions,
}

/// Default cap on model calls per run
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            generation: GenerationOptions::default(),
        }
    }
}

/// Loop states
#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(String),
}

/// Final text plus the session that produced it
#[derive(Debug)]
pub struct RunOutcome {
    pub text: String,
    pub session: Session,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Run a fresh session for a single request
    pub async fn ask(&self, request: &str) -> Result<RunOutcome> {
        let mut session = Session::new(&self.config.generation.model, request);
        let text = self.run(&mut session).await?;
        Ok(RunOutcome { text, session })
    }

    /// Drive the loop until the model answers without tool requests
    pub async fn run(&self, session: &mut Session) -> Result<String> {
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => self.await_model(session).await?,
                LoopState::ExecutingTools(calls) => {
                    self.execute_tools(session, &calls).await;
                    LoopState::AwaitingModel
                }
                LoopState::Done(text) => {
                    tracing::info!(
                        iterations = session.iterations,
                        tools = session.invocations.len(),
                        "Agent run finished"
                    );
                    return Ok(text);
                }
            };
        }
    }

    async fn await_model(&self, session: &mut Session) -> Result<LoopState> {
        if session.iterations >= self.config.max_iterations {
            return Err(AgentError::MaxIterations(self.config.max_iterations));
        }
        session.iterations += 1;

        tracing::debug!(
            iteration = session.iterations,
            provider = self.provider.name(),
            "Requesting completion"
        );

        let schemas = self.tools.schemas();
        let completion = self
            .provider
            .complete(session.conversation.messages(), &schemas, &self.config.generation)
            .await?;

        let response = completion.to_response();
        session.push(Message::assistant(completion.content));

        Ok(match response {
            ModelResponse::FinalText(text) => LoopState::Done(text),
            ModelResponse::ToolRequests { calls, .. } => LoopState::ExecutingTools(calls),
        })
    }

    /// Execute every requested tool in order, then append all results as one turn
    async fn execute_tools(&self, session: &mut Session, calls: &[ToolCall]) {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            tracing::debug!(tool = %call.name, "Executing tool");

            let result = self.execute_tool(call).await;
            session.record(call, &result);

            results.push(ContentBlock::ToolResult {
                tool_use_id: call.id.clone().unwrap_or_default(),
                content: result.output,
                is_error: !result.success,
            });
        }

        session.push(Message::tool_results(results));
    }

    /// Execute a tool call; errors become failed results
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                ToolResult {
                    name: call.name.clone(),
                    id: call.id.clone(),
                    success: false,
                    output: format!("Error: {e}"),
                }
            }
        }
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.generation.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
