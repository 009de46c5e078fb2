//! Composition root.
//!
//! Reads configuration and secrets, decides the mode once, and builds the
//! matching identity provider, session manager and services. This is the
//! only place that branches on `AppMode`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use biglabs_core::auth::{AppMode, decide_mode};
use biglabs_core::config::RootConfig;
use biglabs_core::secret::SecretService;
use biglabs_core::session::{
    IdentityProvider, RemoteIdentityProvider, SessionManager, SyntheticIdentityProvider,
};
use biglabs_infrastructure::paths::BiglabsPaths;
use biglabs_infrastructure::storage::SessionStorage;
use biglabs_infrastructure::{
    ConfigService, SecretServiceImpl, SupabaseAuthClient, SupabaseHttp, SupabaseProfileRepository,
};
use biglabs_interaction::InsightService;

use crate::account_service::{AccountService, DemoAccountService, RemoteAccountService};

/// Everything a process needs, wired for the decided mode.
pub struct AppBootstrap {
    pub mode: AppMode,
    pub config: RootConfig,
    pub paths: BiglabsPaths,
    pub session: Arc<SessionManager>,
    pub accounts: Arc<dyn AccountService>,
    pub insights: Arc<InsightService>,
}

impl AppBootstrap {
    /// Builds the services from the configuration directory.
    ///
    /// `base_dir` overrides the default `~/.config/biglabs`. Must be called
    /// inside a Tokio runtime.
    pub async fn build(base_dir: Option<&Path>) -> Result<Self> {
        let paths = BiglabsPaths::new(base_dir);
        let secret_service =
            SecretServiceImpl::new(&paths).map_err(|e| anyhow!("Failed to locate secrets: {}", e))?;
        Self::assemble(paths, secret_service).await
    }

    async fn assemble(paths: BiglabsPaths, secret_service: SecretServiceImpl) -> Result<Self> {
        let config = ConfigService::new(&paths).get_config();

        if !secret_service.secret_file_exists().await {
            match paths.ensure_secret_file() {
                Ok(path) => {
                    tracing::info!("[Bootstrap] Created secret template at {}", path.display())
                }
                Err(e) => tracing::warn!("[Bootstrap] Could not create secret template: {}", e),
            }
        }
        let secrets = secret_service
            .load_secrets()
            .await
            .context("Failed to load secrets")?;

        let mode = decide_mode(&secrets);
        tracing::info!("[Bootstrap] Running in {} mode", mode);

        let (session, accounts): (Arc<SessionManager>, Arc<dyn AccountService>) = match mode {
            AppMode::Demo => {
                let provider: Arc<dyn IdentityProvider> = Arc::new(SyntheticIdentityProvider::new());
                let accounts: Arc<dyn AccountService> = Arc::new(DemoAccountService::new());
                (SessionManager::start(provider)?, accounts)
            }
            AppMode::Live => {
                let supabase = secrets
                    .usable_supabase()
                    .ok_or_else(|| anyhow!("Live mode without Supabase credentials"))?;
                let http = SupabaseHttp::new(
                    supabase,
                    Duration::from_secs(config.auth.request_timeout_secs),
                )?;

                let storage = if config.auth.persist_session {
                    let session_file = paths
                        .session_file()
                        .map_err(|e| anyhow!("Failed to locate session file: {}", e))?;
                    Some(SessionStorage::with_path(session_file))
                } else {
                    None
                };

                let auth = Arc::new(SupabaseAuthClient::new(http.clone(), storage));
                let profiles = Arc::new(SupabaseProfileRepository::new(http, auth.clone()));
                let provider: Arc<dyn IdentityProvider> =
                    Arc::new(RemoteIdentityProvider::new(auth.clone(), profiles.clone()));

                let session = SessionManager::start(provider)?;
                let accounts: Arc<dyn AccountService> =
                    Arc::new(RemoteAccountService::new(auth, profiles, session.clone()));
                (session, accounts)
            }
        };

        let insights = Arc::new(InsightService::from_secrets(&secrets, &config.insights));

        Ok(Self {
            mode,
            config,
            paths,
            session,
            accounts,
            insights,
        })
    }

    /// Stops background work. Called at process teardown.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}
