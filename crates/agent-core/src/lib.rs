//! # agent-core
//!
//! Core agent logic with a provider-agnostic LLM abstraction and a tool-use
//! reasoning loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop     │──│  Registry   │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The model decides control flow: each completion is read as either final
//! text or a batch of tool requests ([`provider::ModelResponse`]), and the
//! loop in [`reasoning`] executes requested tools until only text remains.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{ContentBlock, Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ModelResponse};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, RunOutcome};
pub use session::{Session, ToolInvocation};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
