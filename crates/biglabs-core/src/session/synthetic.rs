//! Demo-mode identity provider.

use crate::auth::{AppMode, AuthChangeStream, Identity};
use crate::user::{Profile, demo_identity, demo_profile};

use super::provider::{IdentityProvider, Resolution};

/// Provider that signs in a fixed demo actor without any I/O.
///
/// The demo profile is immutable, so profile loads yield nothing new and
/// sign-out has no remote side.
#[derive(Debug, Clone, Default)]
pub struct SyntheticIdentityProvider;

impl SyntheticIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl IdentityProvider for SyntheticIdentityProvider {
    fn mode(&self) -> AppMode {
        AppMode::Demo
    }

    fn resolve_immediately(&self) -> Option<Resolution> {
        Some(Resolution::signed_in(demo_identity(), Some(demo_profile())))
    }

    async fn restore(&self) -> Resolution {
        Resolution::signed_in(demo_identity(), Some(demo_profile()))
    }

    async fn load_profile(&self, _identity: &Identity) -> Option<Profile> {
        None
    }

    async fn sign_out(&self) {}

    async fn changes(&self) -> Option<AuthChangeStream> {
        None
    }
}
