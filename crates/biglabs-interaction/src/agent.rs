//! Text-in, text-out agent abstraction.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while executing an agent.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// The request could not be built or the response made no sense.
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The provider rejected or failed the request.
    #[error("Agent process error{}: {message}", .status_code.map(|s| format!(" ({s})")).unwrap_or_default())]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("Agent error: {0}")]
    Other(String),
}

impl AgentError {
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessError { is_retryable: true, .. })
    }

    /// Delay requested by the provider before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ProcessError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// An agent that answers a single user prompt with text.
#[async_trait]
pub trait TextAgent: Send + Sync {
    /// Short description used in logs.
    fn expertise(&self) -> &str;

    async fn execute(&self, prompt: &str) -> Result<String, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_metadata() {
        let err = AgentError::process_error_with_retry_after(
            429,
            "rate limited",
            true,
            Duration::from_secs(3),
        );
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
        assert_eq!(err.to_string(), "Agent process error (429): rate limited");

        let err = AgentError::ExecutionFailed("empty prompt".into());
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after(), None);
    }
}
