//! Anthropic Claude Provider
//!
//! Implementation of `LlmProvider` for the Anthropic Messages API with native
//! tool use. Tool descriptions travel as `tools[].input_schema`, tool requests
//! come back as `tool_use` blocks, and results are returned as `tool_result`
//! blocks inside a user turn.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::ToolSchema,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key sent as `x-api-key`
    pub api_key: String,

    /// Base URL; `/v1/messages` is appended
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create from configuration
    pub fn from_config(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn build_request<'a>(
        messages: &'a [Message],
        tools: &'a [ToolSchema],
        options: &'a GenerationOptions,
    ) -> Request<'a> {
        Request {
            model: &options.model,
            max_tokens: options.max_tokens,
            system: options.system_prompt.as_deref(),
            tools: tools
                .iter()
                .map(|t| ToolDefinition {
                    name: &t.name,
                    description: &t.description,
                    input_schema: t.input_schema(),
                })
                .collect(),
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    // Tool results are carried inside a user turn
                    role: match m.role {
                        Role::User | Role::Tool => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
        }
    }

    fn convert_completion(response: Response) -> Completion {
        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                WireBlock::Text { text } => Some(ContentBlock::Text { text }),
                WireBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                WireBlock::Other => None,
            })
            .collect();

        Completion {
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
            finish_reason: response.stop_reason.as_deref().map(|reason| match reason {
                "end_turn" | "stop_sequence" => FinishReason::Stop,
                "max_tokens" => FinishReason::Length,
                "tool_use" => FinishReason::ToolUse,
                "refusal" => FinishReason::ContentFilter,
                _ => FinishReason::Error,
            }),
        }
    }
}

/// Map a non-success status and body to an agent error
fn status_error(status: StatusCode, body: &str) -> AgentError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect());

    match status.as_u16() {
        401 | 403 => AgentError::Auth(message),
        429 => AgentError::RateLimited(message),
        500..=599 => AgentError::ProviderUnavailable(format!("{status}: {message}")),
        _ => AgentError::Provider(format!("{status}: {message}")),
    }
}

fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, tools, options);

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: Response = serde_json::from_str(&body)
            .map_err(|e| AgentError::Parse(format!("Anthropic response: {e}")))?;

        let completion = Self::convert_completion(parsed);
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                model = %completion.model,
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "Completion received"
            );
        }
        Ok(completion)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition<'a>>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct ToolDefinition<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: serde_json::Value,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a [ContentBlock],
}

#[derive(Deserialize)]
struct Response {
    content: Vec<WireBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::provider::ModelResponse;
    use agent_core::tool::ParameterSchema;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn price_tool() -> ToolSchema {
        ToolSchema {
            name: "get_crypto_price".into(),
            description: "Fetch price data".into(),
            parameters: vec![ParameterSchema::required_string("ticker", "Ticker symbol")],
        }
    }

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            Message::user("Research BTC"),
            Message::assistant(vec![ContentBlock::ToolUse {
                id: "toolu_1".into(),
                name: "get_crypto_price".into(),
                input: json!({"ticker": "BTC"}),
            }]),
            Message::tool_results(vec![ContentBlock::ToolResult {
                tool_use_id: "toolu_1".into(),
                content: "{\"price\": 1}".into(),
                is_error: false,
            }]),
        ];
        let tools = vec![price_tool()];
        let options = GenerationOptions {
            system_prompt: Some("You are an analyst.".into()),
            ..GenerationOptions::default()
        };

        let request = AnthropicProvider::build_request(&messages, &tools, &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system"], "You are an analyst.");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["tools"][0]["name"], "get_crypto_price");
        assert_eq!(json["tools"][0]["input_schema"]["required"], json!(["ticker"]));
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][1]["content"][0]["type"], "tool_use");
        assert_eq!(json["messages"][2]["role"], "user");
        assert_eq!(json["messages"][2]["content"][0]["type"], "tool_result");
        assert_eq!(json["messages"][2]["content"][0]["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_response_with_tool_use() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "I'll look that up."},
                {"type": "tool_use", "id": "toolu_9", "name": "get_crypto_price", "input": {"ticker": "SOL"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 40}
        }"#;

        let parsed: Response = serde_json::from_str(body).unwrap();
        let completion = AnthropicProvider::convert_completion(parsed);

        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.usage.as_ref().unwrap().total_tokens, 160);
        match completion.to_response() {
            ModelResponse::ToolRequests { calls, .. } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id.as_deref(), Some("toolu_9"));
                assert_eq!(calls[0].str_arg("ticker"), Some("SOL"));
            }
            other => panic!("expected tool requests, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_blocks_are_skipped() {
        let body = r#"{
            "model": "m",
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "Final"}
            ],
            "stop_reason": "end_turn"
        }"#;

        let parsed: Response = serde_json::from_str(body).unwrap();
        let completion = AnthropicProvider::convert_completion(parsed);
        assert_eq!(completion.content.len(), 1);
        assert_eq!(completion.to_response(), ModelResponse::FinalText("Final".into()));
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        match status_error(StatusCode::UNAUTHORIZED, body) {
            AgentError::Auth(msg) => assert_eq!(msg, "invalid x-api-key"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            AgentError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            AgentError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "{}"),
            AgentError::Provider(_)
        ));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AnthropicConfig::new("sk-ant-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert_eq!(config.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[tokio::test]
    async fn test_complete_against_stub_server() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"model":"claude-test","content":[{"type":"text","text":"Report"}],"stop_reason":"end_turn","usage":{"input_tokens":3,"output_tokens":1}}"#,
        )
        .await;

        let provider = AnthropicProvider::from_config(
            AnthropicConfig::new("test-key").with_base_url(base_url),
        )
        .unwrap();

        let completion = provider
            .complete(
                &[Message::user("Research BTC")],
                &[price_tool()],
                &GenerationOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(completion.text(), "Report");
        assert_eq!(completion.model, "claude-test");

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /v1/messages"));
        assert!(raw_request.to_ascii_lowercase().contains("x-api-key: test-key"));
        assert!(raw_request.contains("anthropic-version: 2023-06-01"));
        assert!(raw_request.contains("\"get_crypto_price\""));
    }

    #[tokio::test]
    async fn test_complete_maps_auth_failure() {
        let (base_url, _server) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        )
        .await;

        let provider = AnthropicProvider::from_config(
            AnthropicConfig::new("bad").with_base_url(base_url),
        )
        .unwrap();

        let err = provider
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Auth(_)));
    }
}
