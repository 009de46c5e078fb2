//! Configuration models.
//!
//! `RootConfig` mirrors `config.toml` (non-sensitive settings) and
//! `SecretConfig` mirrors `secret.json` (API keys and service credentials).

use serde::{Deserialize, Serialize};

/// Marker used by scaffolded `.env`/secret templates for unset credentials.
pub const PLACEHOLDER_MARKER: &str = "placeholder";

/// Default Anthropic model for business insights.
pub const DEFAULT_INSIGHT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Returns true when a credential value is unusable: empty or a template placeholder.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.contains(PLACEHOLDER_MARKER)
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub insights: InsightSettings,
    pub auth: AuthSettings,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            insights: InsightSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

/// Settings for the business-insight generator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InsightSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_INSIGHT_MODEL.to_string(),
            max_tokens: 1024,
        }
    }
}

/// Settings for the remote authentication client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AuthSettings {
    /// Persist the signed-in session to `session.json` between runs.
    pub persist_session: bool,
    /// Per-request timeout for Supabase calls.
    pub request_timeout_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout_secs: 30,
        }
    }
}

/// Root of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<ClaudeConfig>,
}

impl SecretConfig {
    /// Returns the Supabase credentials only when both values are usable.
    pub fn usable_supabase(&self) -> Option<&SupabaseConfig> {
        self.supabase.as_ref().filter(|s| s.is_configured())
    }

    /// Returns the Claude credentials only when the API key is usable.
    pub fn usable_claude(&self) -> Option<&ClaudeConfig> {
        self.claude.as_ref().filter(|c| c.is_configured())
    }
}

/// Supabase project credentials.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        !is_placeholder(&self.url) && !is_placeholder(&self.anon_key)
    }
}

/// Anthropic API credentials.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClaudeConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl ClaudeConfig {
    pub fn is_configured(&self) -> bool {
        !is_placeholder(&self.api_key)
    }
}
