//! LLM-backed interactions for Biglabs.
//!
//! - `agent`: the `TextAgent` seam and its error type
//! - `claude_api_agent`: Anthropic Messages API implementation
//! - `insights`: business-insight generation with canned preview answers

pub mod agent;
pub mod claude_api_agent;
pub mod insights;

pub use agent::{AgentError, TextAgent};
pub use claude_api_agent::ClaudeApiAgent;
pub use insights::{InsightContext, InsightResponse, InsightService};
