//! Session Management
//!
//! A session is one agent run: the conversation plus a log of the tools the
//! model invoked. Sessions live for a single invocation and are never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message};
use crate::tool::{ToolCall, ToolResult};

/// Characters of tool output kept in the invocation log
const PREVIEW_CHARS: usize = 200;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record of one tool execution during a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name as requested by the model
    pub tool: String,

    /// Input arguments as sent by the model
    pub input: serde_json::Value,

    /// Whether the tool succeeded
    pub success: bool,

    /// Leading part of the output
    pub result_preview: String,
}

impl ToolInvocation {
    pub fn new(call: &ToolCall, result: &ToolResult) -> Self {
        Self {
            tool: call.name.clone(),
            input: call.input(),
            success: result.success,
            result_preview: preview(&result.output),
        }
    }
}

fn preview(output: &str) -> String {
    if output.chars().count() > PREVIEW_CHARS {
        let head: String = output.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        output.to_string()
    }
}

/// A single agent run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history
    pub conversation: Conversation,

    /// Tools executed, in execution order
    pub invocations: Vec<ToolInvocation>,

    /// Model the run talks to
    pub model: String,

    /// Model calls made so far
    pub iterations: usize,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session seeded with the user's request
    pub fn new(model: impl Into<String>, request: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            conversation: Conversation::with_user_message(request),
            invocations: Vec::new(),
            model: model.into(),
            iterations: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Append a turn
    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
        self.touch();
    }

    /// Log a tool execution
    pub fn record(&mut self, call: &ToolCall, result: &ToolResult) {
        self.invocations.push(ToolInvocation::new(call, result));
        self.touch();
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Duration since creation
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}
