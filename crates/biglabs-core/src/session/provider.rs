//! Identity provider interface.

use crate::auth::{AppMode, AuthChangeStream, Identity};
use crate::user::Profile;

/// Identity and profile produced by a resolution step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
}

impl Resolution {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity, profile: Option<Profile>) -> Self {
        Self {
            identity: Some(identity),
            profile,
        }
    }
}

/// Source of identity for the session manager.
///
/// One implementation per operating mode; the manager depends only on this
/// trait. None of the methods fail: implementations log remote errors and
/// report the degraded outcome instead.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The operating mode this provider serves.
    fn mode(&self) -> AppMode;

    /// Returns the resolution when it is known without any I/O.
    ///
    /// `None` means the manager must await [`IdentityProvider::restore`].
    fn resolve_immediately(&self) -> Option<Resolution>;

    /// Restores the existing session and its profile.
    ///
    /// Lookup failures resolve to an anonymous session.
    async fn restore(&self) -> Resolution;

    /// Loads the profile of `identity`.
    ///
    /// `None` means no fresh profile is available and any stored one should
    /// be kept if it still belongs to the same identity.
    async fn load_profile(&self, identity: &Identity) -> Option<Profile>;

    /// Ends the session on the provider side. Best effort.
    async fn sign_out(&self);

    /// Opens the stream of auth changes, if the provider has one.
    async fn changes(&self) -> Option<AuthChangeStream>;

    /// Resolves the identity carried by a change notification.
    async fn resolve_change(&self, identity: Option<Identity>) -> Resolution {
        match identity {
            Some(identity) => {
                let profile = self.load_profile(&identity).await;
                Resolution::signed_in(identity, profile)
            }
            None => Resolution::anonymous(),
        }
    }
}
