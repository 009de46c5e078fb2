//! Remote authentication client trait.

use tokio::sync::mpsc;

use super::model::{AuthChange, AuthSession, SignUpAttributes, SignUpOutcome};
use crate::error::Result;

/// Receiving end of an auth change subscription.
///
/// Dropping it cancels the subscription.
pub type AuthChangeStream = mpsc::UnboundedReceiver<AuthChange>;

/// Client for the remote authentication service.
///
/// Implementations own the session token lifecycle (storage, refresh) and
/// report every state change to subscribers in the order it happened.
#[async_trait::async_trait]
pub trait RemoteAuthClient: Send + Sync {
    /// Returns the current session, if one exists and is still valid.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Signs in with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Creates a new account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Changes the password of the signed-in user.
    async fn update_password(&self, new_password: &str) -> Result<()>;

    /// Sends a password-recovery email.
    async fn request_password_reset(&self, email: &str) -> Result<()>;

    /// Subscribes to auth state changes for the remainder of the process.
    fn subscribe(&self) -> AuthChangeStream;
}
