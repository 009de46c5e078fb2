//! Account flows: sign-in, sign-up, password changes and profile edits.
//!
//! Demo installs accept every flow without I/O; live installs go through
//! the remote auth client and profile store. Session state itself is never
//! touched here; the session manager learns about sign-ins from the auth
//! client's change notifications.

use std::sync::Arc;

use async_trait::async_trait;
use biglabs_core::auth::{RemoteAuthClient, SignUpAttributes, SignUpOutcome};
use biglabs_core::session::SessionManager;
use biglabs_core::user::{ProfileRepository, ProfileUpdate};
use biglabs_core::{BiglabsError, Result};

const MIN_PASSWORD_LEN: usize = 6;

/// Result of a successful sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpStatus {
    /// The account is active and signed in.
    Active,
    /// A verification email was sent; sign-in is possible after confirming.
    ConfirmationRequired,
}

/// Checks a new password and its confirmation before any remote call.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<()> {
    if password != confirmation {
        return Err(BiglabsError::validation("Passwords do not match."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BiglabsError::validation(
            "Password must be at least 6 characters.",
        ));
    }
    Ok(())
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<SignUpStatus>;

    /// Validates `password` against `confirmation`, then changes it.
    async fn update_password(&self, password: &str, confirmation: &str) -> Result<()>;

    /// Saves profile edits for the signed-in user.
    async fn save_profile(&self, update: &ProfileUpdate) -> Result<()>;

    async fn request_password_reset(&self, email: &str) -> Result<()>;
}

/// Accepts every flow without I/O.
#[derive(Debug, Clone, Default)]
pub struct DemoAccountService;

impl DemoAccountService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountService for DemoAccountService {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<()> {
        tracing::info!("[DemoAccount] Sign-in accepted for {}", email);
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _first_name: &str,
        _last_name: &str,
    ) -> Result<SignUpStatus> {
        tracing::info!("[DemoAccount] Sign-up accepted for {}", email);
        Ok(SignUpStatus::Active)
    }

    async fn update_password(&self, password: &str, confirmation: &str) -> Result<()> {
        validate_new_password(password, confirmation)
    }

    async fn save_profile(&self, _update: &ProfileUpdate) -> Result<()> {
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> Result<()> {
        Ok(())
    }
}

/// Account flows against the remote auth service and profile store.
pub struct RemoteAccountService {
    auth: Arc<dyn RemoteAuthClient>,
    profiles: Arc<dyn ProfileRepository>,
    session: Arc<SessionManager>,
}

impl RemoteAccountService {
    pub fn new(
        auth: Arc<dyn RemoteAuthClient>,
        profiles: Arc<dyn ProfileRepository>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            auth,
            profiles,
            session,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl AccountService for RemoteAccountService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        self.auth.sign_in_with_password(email, password).await?;
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<SignUpStatus> {
        let attributes = SignUpAttributes {
            first_name: non_empty(first_name),
            last_name: non_empty(last_name),
        };

        match self.auth.sign_up(email, password, attributes).await? {
            SignUpOutcome::SignedIn(_) => Ok(SignUpStatus::Active),
            SignUpOutcome::ConfirmationRequired => Ok(SignUpStatus::ConfirmationRequired),
        }
    }

    async fn update_password(&self, password: &str, confirmation: &str) -> Result<()> {
        validate_new_password(password, confirmation)?;
        self.auth.update_password(password).await
    }

    async fn save_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let identity = self
            .session
            .snapshot()
            .identity
            .ok_or_else(|| BiglabsError::auth("Not signed in"))?;

        if let Err(e) = self.profiles.update(&identity.id, update).await {
            tracing::error!("[RemoteAccount] Failed to save profile {}: {}", identity.id, e);
            return Err(e);
        }

        self.session.refresh_profile().await;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.auth.request_password_reset(email).await
    }
}
