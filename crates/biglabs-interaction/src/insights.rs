//! Business-insight generation.
//!
//! Without a usable Anthropic key the service answers with canned samples
//! flagged as `preview`, so the dashboard works in demo installs.

use std::str::FromStr;
use std::sync::Arc;

use biglabs_core::config::{InsightSettings, SecretConfig};
use biglabs_core::{BiglabsError, Result};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::agent::TextAgent;
use crate::claude_api_agent::ClaudeApiAgent;

const SYSTEM_PROMPT: &str = "You are an AI business intelligence assistant for a consulting firm called Biglabs. Provide concise, data-driven insights and recommendations. Be professional, precise, and actionable.";

/// Dashboard area a question comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum InsightContext {
    Analytics,
    Strategy,
    Default,
}

impl InsightContext {
    /// Parses a context label; absent or unknown labels map to `Default`.
    pub fn parse(label: Option<&str>) -> Self {
        label
            .and_then(|label| Self::from_str(label.trim()).ok())
            .unwrap_or(Self::Default)
    }

    /// Canned answer used when no model is available.
    pub fn sample_response(self) -> &'static str {
        match self {
            Self::Analytics => {
                "Based on your current metrics, revenue has grown 78% over the past 6 months. Key drivers include Digital Transformation (+34%) and AI/ML services (+28%). Recommendation: Expand AI team capacity by 2 FTEs to capture growing demand in the healthcare vertical."
            }
            Self::Strategy => {
                "Market analysis indicates three high-potential sectors for expansion: renewable energy, fintech, and biotech. Each presents $5M+ addressable market opportunity within your current service capabilities."
            }
            Self::Default => {
                "I can help you analyze business data, generate reports, identify trends, and provide strategic recommendations. What would you like to explore?"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightResponse {
    pub response: String,
    /// True when the text is a canned sample rather than a model answer.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub preview: bool,
}

/// Answers business questions through a `TextAgent`, or with samples.
pub struct InsightService {
    agent: Option<Arc<dyn TextAgent>>,
}

impl InsightService {
    pub fn new(agent: Option<Arc<dyn TextAgent>>) -> Self {
        Self { agent }
    }

    /// Builds the service from loaded secrets.
    ///
    /// Absent, empty or placeholder API keys leave the service in preview mode.
    pub fn from_secrets(secrets: &SecretConfig, settings: &InsightSettings) -> Self {
        let agent = secrets.usable_claude().map(|claude| {
            let agent = ClaudeApiAgent::from_config(claude, settings).with_system(SYSTEM_PROMPT);
            tracing::info!("[InsightService] Using Claude model {}", agent.model());
            Arc::new(agent) as Arc<dyn TextAgent>
        });

        if agent.is_none() {
            tracing::info!("[InsightService] No Anthropic API key configured, serving previews");
        }

        Self::new(agent)
    }

    pub fn is_preview(&self) -> bool {
        self.agent.is_none()
    }

    /// Generates an answer for `message` asked from `context`.
    ///
    /// # Errors
    ///
    /// Returns `BiglabsError::Remote` when the model call fails. The cause is
    /// logged, not returned.
    pub async fn generate(&self, message: &str, context: Option<&str>) -> Result<InsightResponse> {
        let Some(agent) = &self.agent else {
            let context = InsightContext::parse(context);
            tracing::debug!("[InsightService] Preview answer for context {}", context);
            return Ok(InsightResponse {
                response: context.sample_response().to_string(),
                preview: true,
            });
        };

        match agent.execute(message).await {
            Ok(response) => Ok(InsightResponse {
                response,
                preview: false,
            }),
            Err(e) => {
                tracing::error!("[InsightService] {} failed: {}", agent.expertise(), e);
                Err(BiglabsError::remote(Some(500), "Failed to generate response"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use async_trait::async_trait;
    use biglabs_core::config::ClaudeConfig;
    use std::sync::Mutex;

    struct MockAgent {
        reply: std::result::Result<String, AgentError>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockAgent {
        fn replying(reply: std::result::Result<String, AgentError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextAgent for MockAgent {
        fn expertise(&self) -> &str {
            "mock agent"
        }

        async fn execute(&self, prompt: &str) -> std::result::Result<String, AgentError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[test]
    fn test_context_parsing() {
        assert_eq!(InsightContext::parse(Some("analytics")), InsightContext::Analytics);
        assert_eq!(InsightContext::parse(Some("Strategy")), InsightContext::Strategy);
        assert_eq!(InsightContext::parse(Some("pricing")), InsightContext::Default);
        assert_eq!(InsightContext::parse(None), InsightContext::Default);
    }

    #[tokio::test]
    async fn test_preview_without_agent() {
        let service = InsightService::new(None);
        assert!(service.is_preview());

        let answer = service.generate("How are we doing?", Some("analytics")).await.unwrap();
        assert!(answer.preview);
        assert!(answer.response.starts_with("Based on your current metrics"));

        let answer = service.generate("Hi", Some("unknown")).await.unwrap();
        assert_eq!(answer.response, InsightContext::Default.sample_response());
    }

    #[tokio::test]
    async fn test_agent_answer_is_returned() {
        let agent = MockAgent::replying(Ok("Grow the fintech practice.".to_string()));
        let service = InsightService::new(Some(agent.clone()));

        let answer = service.generate("Where to expand?", Some("strategy")).await.unwrap();
        assert_eq!(
            answer,
            InsightResponse {
                response: "Grow the fintech practice.".to_string(),
                preview: false,
            }
        );
        assert_eq!(agent.prompts.lock().unwrap().as_slice(), ["Where to expand?"]);
    }

    #[tokio::test]
    async fn test_agent_failure_is_generic_remote_error() {
        let agent = MockAgent::replying(Err(AgentError::Other("boom".into())));
        let service = InsightService::new(Some(agent));

        let err = service.generate("Anything", None).await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.message(), "Failed to generate response");
    }

    #[test]
    fn test_placeholder_key_means_preview() {
        let settings = InsightSettings::default();
        let secrets = SecretConfig {
            supabase: None,
            claude: Some(ClaudeConfig {
                api_key: "sk-ant-placeholder".to_string(),
                model_name: None,
            }),
        };
        assert!(InsightService::from_secrets(&secrets, &settings).is_preview());

        let secrets = SecretConfig {
            supabase: None,
            claude: Some(ClaudeConfig {
                api_key: "sk-ant-real".to_string(),
                model_name: None,
            }),
        };
        assert!(!InsightService::from_secrets(&secrets, &settings).is_preview());
    }

    #[test]
    fn test_preview_flag_serialization() {
        let live = InsightResponse {
            response: "ok".to_string(),
            preview: false,
        };
        assert_eq!(serde_json::to_value(&live).unwrap(), serde_json::json!({"response": "ok"}));
    }
}
