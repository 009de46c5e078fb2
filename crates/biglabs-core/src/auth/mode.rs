//! Operating mode selection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::SecretConfig;

/// Process-wide operating mode, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppMode {
    /// No usable remote credentials: synthetic identity, no network I/O.
    Demo,
    /// Backed by the remote authentication service.
    Live,
}

/// Decides the operating mode from the loaded secret configuration.
///
/// Demo unless the Supabase URL and anon key are both present and neither is
/// a template placeholder.
pub fn decide_mode(secrets: &SecretConfig) -> AppMode {
    match secrets.usable_supabase() {
        Some(_) => AppMode::Live,
        None => AppMode::Demo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;

    fn supabase(url: &str, anon_key: &str) -> SecretConfig {
        SecretConfig {
            supabase: Some(SupabaseConfig {
                url: url.to_string(),
                anon_key: anon_key.to_string(),
            }),
            claude: None,
        }
    }

    #[test]
    fn test_missing_credentials_select_demo() {
        assert_eq!(decide_mode(&SecretConfig::default()), AppMode::Demo);
    }

    #[test]
    fn test_placeholder_or_empty_credentials_select_demo() {
        assert_eq!(
            decide_mode(&supabase("https://placeholder.supabase.co", "key")),
            AppMode::Demo
        );
        assert_eq!(
            decide_mode(&supabase("https://abc.supabase.co", "")),
            AppMode::Demo
        );
    }

    #[test]
    fn test_valid_credentials_select_live() {
        assert_eq!(
            decide_mode(&supabase("https://abc.supabase.co", "eyJhbGciOi")),
            AppMode::Live
        );
    }

    #[test]
    fn test_mode_display_and_parse() {
        assert_eq!(AppMode::Demo.to_string(), "demo");
        assert_eq!("live".parse::<AppMode>().unwrap(), AppMode::Live);
    }
}
