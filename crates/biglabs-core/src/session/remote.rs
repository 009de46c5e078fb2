//! Live-mode identity provider.

use std::sync::Arc;

use crate::auth::{AppMode, AuthChangeStream, Identity, RemoteAuthClient};
use crate::user::{Profile, ProfileRepository};

use super::provider::{IdentityProvider, Resolution};

/// Provider backed by the remote auth client and the profile store.
///
/// Collaborator errors are logged here and never surface to the manager.
pub struct RemoteIdentityProvider {
    auth: Arc<dyn RemoteAuthClient>,
    profiles: Arc<dyn ProfileRepository>,
}

impl RemoteIdentityProvider {
    pub fn new(auth: Arc<dyn RemoteAuthClient>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { auth, profiles }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    fn mode(&self) -> AppMode {
        AppMode::Live
    }

    fn resolve_immediately(&self) -> Option<Resolution> {
        None
    }

    async fn restore(&self) -> Resolution {
        // A failed lookup is indistinguishable from "no session" for consumers.
        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[RemoteIdentity] Session lookup failed: {}", e);
                None
            }
        };

        match session {
            Some(session) => {
                let identity = Identity::from(&session);
                let profile = self.load_profile(&identity).await;
                Resolution::signed_in(identity, profile)
            }
            None => Resolution::anonymous(),
        }
    }

    async fn load_profile(&self, identity: &Identity) -> Option<Profile> {
        match self.profiles.find_by_id(&identity.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::debug!("[RemoteIdentity] No profile row for user {}", identity.id);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "[RemoteIdentity] Profile fetch failed for user {}: {}",
                    identity.id,
                    e
                );
                None
            }
        }
    }

    async fn sign_out(&self) {
        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!("[RemoteIdentity] Remote sign-out failed: {}", e);
        }
    }

    async fn changes(&self) -> Option<AuthChangeStream> {
        Some(self.auth.subscribe())
    }
}
