//! Access to service credentials.

use crate::config::SecretConfig;
use crate::error::Result;

/// Loads Supabase and Anthropic credentials.
///
/// Values are never logged. A missing source is not an error: it yields an
/// empty configuration, which routes the process to demo mode.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// True when a secrets file is present on disk, usable or not.
    async fn secret_file_exists(&self) -> bool;
}
