//! # agent-runtime
//!
//! Reasoning-engine providers for the research agent.
//!
//! ## Providers
//!
//! - **Anthropic** (default): Claude Messages API with native tool use
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::anthropic::{AnthropicConfig, AnthropicProvider};
//!
//! let provider = AnthropicProvider::from_config(AnthropicConfig::new(api_key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentError, LlmProvider, Message, Result, Role, Session, Tool,
    ToolRegistry,
};
