//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for reasoning-engine backends so the agent
//! works with any tool-calling model API without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = AnthropicProvider::from_config(config)?;
//! let completion = provider.complete(&messages, &tools, &options).await?;
//! match completion.to_response() {
//!     ModelResponse::FinalText(text) => println!("{text}"),
//!     ModelResponse::ToolRequests { calls, .. } => { /* execute */ }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{ContentBlock, Message};
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt, sent separately from the conversation turns
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Default model for research runs
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const fn default_max_tokens() -> u32 {
    4096
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// Content blocks in the order the model produced them
    pub content: Vec<ContentBlock>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// What the model asked for in one completion
#[derive(Clone, Debug, PartialEq)]
pub enum ModelResponse {
    /// No tool requests; the text is the answer
    FinalText(String),

    /// One or more tool requests, possibly with accompanying text
    ToolRequests {
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
}

impl Completion {
    /// Concatenated text blocks
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }

    /// Tool requests in the order they appear
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    name: name.clone(),
                    arguments: input.as_object().cloned().unwrap_or_default(),
                    id: Some(id.clone()),
                }),
                _ => None,
            })
            .collect()
    }

    /// Classify the completion for the reasoning loop.
    ///
    /// The presence of tool-use blocks decides, not `finish_reason`.
    pub fn to_response(&self) -> ModelResponse {
        let calls = self.tool_calls();
        let text = self.text();

        if calls.is_empty() {
            ModelResponse::FinalText(text)
        } else {
            ModelResponse::ToolRequests {
                text: (!text.trim().is_empty()).then_some(text),
                calls,
            }
        }
    }
}

/// Strategy trait for reasoning-engine providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and display
    fn name(&self) -> &str;

    /// Generate a completion from the conversation and tool descriptions
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}
