//! Secret service implementation.
//!
//! Loads secret configuration (Supabase and Anthropic credentials) from
//! secret.json, falling back to environment variables for anything the file
//! does not configure.

use crate::paths::{BiglabsPaths, PathError};
use crate::storage::{SecretStorage, SecretStorageError};
use biglabs_core::config::{ClaudeConfig, SecretConfig, SupabaseConfig};
use biglabs_core::secret::SecretService;
use biglabs_core::{BiglabsError, Result};
use std::sync::{Arc, RwLock};

/// Environment variables consulted when secret.json lacks a usable value.
const ENV_SUPABASE_URL: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const ENV_SUPABASE_ANON_KEY: [&str; 2] = ["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];
const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
const ENV_CLAUDE_MODEL_NAME: &str = "CLAUDE_MODEL_NAME";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Service for loading secret configuration.
///
/// Priority: usable values in secret.json > environment variables. The
/// merged result is cached to avoid repeated file I/O.
///
/// # Example
///
/// ```ignore
/// use biglabs_infrastructure::{SecretServiceImpl, paths::BiglabsPaths};
/// use biglabs_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(&BiglabsPaths::default())?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    storage: SecretStorage,
    /// Source of fallback values; the process environment unless replaced.
    env: EnvLookup,
    /// Cached secret config.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(paths: &BiglabsPaths) -> std::result::Result<Self, PathError> {
        Ok(Self::with_storage(SecretStorage::with_path(paths.secret_file()?)))
    }

    pub fn with_storage(storage: SecretStorage) -> Self {
        Self {
            storage,
            env: Arc::new(|key| std::env::var(key).ok()),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the environment used for fallback values.
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    /// Loads the secrets if not already cached.
    fn load_secrets_internal(&self) -> Result<SecretConfig> {
        {
            let read_lock = self.secrets.read().unwrap_or_else(|p| p.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let from_file = match self.storage.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!("[SecretService] No secret file at {}", path.display());
                SecretConfig::default()
            }
            Err(e) => {
                return Err(BiglabsError::config(format!(
                    "Failed to load {}: {}",
                    self.storage.path().display(),
                    e
                )));
            }
        };

        let loaded = apply_env_fallback(from_file, |key| (self.env)(key));

        {
            let mut write_lock = self.secrets.write().unwrap_or_else(|p| p.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.path().exists()
    }
}

/// Fills sections the file leaves unusable from `lookup`.
pub(crate) fn apply_env_fallback(
    mut config: SecretConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SecretConfig {
    let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

    if config.usable_supabase().is_none() {
        if let (Some(url), Some(anon_key)) = (
            first(&ENV_SUPABASE_URL[..]),
            first(&ENV_SUPABASE_ANON_KEY[..]),
        ) {
            let candidate = SupabaseConfig { url, anon_key };
            if candidate.is_configured() {
                config.supabase = Some(candidate);
            }
        }
    }

    if config.usable_claude().is_none() {
        if let Some(api_key) = lookup(ENV_ANTHROPIC_API_KEY) {
            let candidate = ClaudeConfig {
                api_key,
                model_name: lookup(ENV_CLAUDE_MODEL_NAME),
            };
            if candidate.is_configured() {
                config.claude = Some(candidate);
            }
        }
    }

    config
}
