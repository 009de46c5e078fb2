//! ClaudeApiAgent - Direct REST API implementation for Claude.
//!
//! Calls the Anthropic Messages API with a single user message and returns
//! the first text block of the reply.

use std::time::Duration;

use async_trait::async_trait;
use biglabs_core::config::{ClaudeConfig, InsightSettings};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, TextAgent};

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Returned when the reply carries no text block.
pub const EMPTY_RESPONSE_TEXT: &str = "No response generated.";

/// Agent implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiAgent {
    client: Client,
    api_key: String,
    model: String,
    system: Option<String>,
    max_tokens: u32,
}

impl ClaudeApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            system: None,
            max_tokens: 1024,
        }
    }

    /// Builds an agent from stored credentials and insight settings.
    ///
    /// A model named in `secret.json` overrides the one in `config.toml`.
    pub fn from_config(claude: &ClaudeConfig, settings: &InsightSettings) -> Self {
        let model = claude
            .model_name
            .clone()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| settings.model.clone());

        Self::new(claude.api_key.clone(), model).with_max_tokens(settings.max_tokens)
    }

    /// Adds a system prompt that will be sent alongside every request.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str) -> Result<CreateMessageRequest, AgentError> {
        if prompt.trim().is_empty() {
            return Err(AgentError::ExecutionFailed(
                "Claude prompt must not be empty".into(),
            ));
        }

        Ok(CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: prompt.to_string(),
                }],
            }],
            max_tokens: self.max_tokens,
            system: self.system.clone(),
        })
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, AgentError> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| AgentError::ProcessError {
                status_code: None,
                message: format!("Claude API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| AgentError::Other(format!("Failed to parse Claude response: {err}")))?;

        Ok(extract_text_response(parsed))
    }
}

#[async_trait]
impl TextAgent for ClaudeApiAgent {
    fn expertise(&self) -> &str {
        "Claude API agent for business intelligence"
    }

    async fn execute(&self, prompt: &str) -> Result<String, AgentError> {
        let request = self.build_request(prompt)?;
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    /// Tool use, thinking and future block kinds.
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> String {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string())
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AgentError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    if let Some(delay) = retry_after {
        AgentError::process_error_with_retry_after(status.as_u16(), message, is_retryable, delay)
    } else {
        AgentError::ProcessError {
            status_code: Some(status.as_u16()),
            message,
            is_retryable,
            retry_after: None,
        }
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are not supported.
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_prefers_secret_model() {
        let settings = InsightSettings::default();
        let claude = ClaudeConfig {
            api_key: "sk-ant-test".to_string(),
            model_name: Some("claude-haiku".to_string()),
        };
        assert_eq!(ClaudeApiAgent::from_config(&claude, &settings).model(), "claude-haiku");

        let claude = ClaudeConfig {
            api_key: "sk-ant-test".to_string(),
            model_name: None,
        };
        assert_eq!(
            ClaudeApiAgent::from_config(&claude, &settings).model(),
            settings.model
        );
    }

    #[test]
    fn test_request_body_shape() {
        let agent = ClaudeApiAgent::new("key", "claude-sonnet-4-5-20250929").with_system("Be brief.");
        let request = agent.build_request("Summarize Q3").unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(value["max_tokens"], 1024);
        assert_eq!(value["system"], "Be brief.");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][0]["text"], "Summarize Q3");
    }

    #[test]
    fn test_request_omits_missing_system() {
        let request = ClaudeApiAgent::new("key", "model").build_request("hi").unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let agent = ClaudeApiAgent::new("key", "model");
        assert!(matches!(
            agent.build_request("   "),
            Err(AgentError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn test_extract_first_text_block() {
        let body = r#"{"content":[
            {"type":"thinking","thinking":"..."},
            {"type":"text","text":"Revenue is up."},
            {"type":"text","text":"ignored"}
        ]}"#;
        let response: CreateMessageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_text_response(response), "Revenue is up.");
    }

    #[test]
    fn test_extract_without_text_block() {
        let response: CreateMessageResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(extract_text_response(response), EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn test_map_http_error_reads_error_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = map_http_error(
            StatusCode::SERVICE_UNAVAILABLE,
            body.to_string(),
            Some(Duration::from_secs(5)),
        );
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn test_map_http_error_client_error_not_retryable() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, "bad key".to_string(), None);
        assert!(!err.is_retryable());
        assert!(matches!(
            err,
            AgentError::ProcessError { status_code: Some(401), ref message, .. } if message == "bad key"
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));

        let header = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&header)), None);
        assert_eq!(parse_retry_after(None), None);
    }
}
