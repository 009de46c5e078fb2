//! Externally observable session state.

use serde::Serialize;

use crate::auth::{AppMode, Identity};
use crate::user::Profile;

/// Point-in-time view of the session.
///
/// `loading` is true only until the first resolution completes. A present
/// `profile` always belongs to the present `identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub mode: AppMode,
    /// True while the synthetic demo identity is signed in.
    pub is_demo: bool,
    pub loading: bool,
}

impl SessionSnapshot {
    /// The state before any resolution has happened.
    pub fn unresolved(mode: AppMode) -> Self {
        Self {
            identity: None,
            profile: None,
            mode,
            is_demo: false,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }
}

impl SessionSnapshot {
    /// Replaces identity and profile and marks the session resolved.
    ///
    /// A profile that does not belong to `identity` is dropped.
    pub(crate) fn resolve(&mut self, identity: Option<Identity>, profile: Option<Profile>) {
        let profile = match &identity {
            Some(identity) => profile.filter(|profile| profile.id == identity.id),
            None => None,
        };
        self.is_demo = self.mode == AppMode::Demo && identity.is_some();
        self.identity = identity;
        self.profile = profile;
        self.loading = false;
    }

    /// Clears identity and profile, leaving the mode untouched.
    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
        self.profile = None;
        self.is_demo = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{demo_identity, demo_profile};

    #[test]
    fn test_resolve_drops_foreign_profile() {
        let mut snapshot = SessionSnapshot::unresolved(AppMode::Live);
        snapshot.resolve(Some(Identity::new("someone-else", None)), Some(demo_profile()));

        assert!(!snapshot.loading);
        assert!(snapshot.identity.is_some());
        assert!(snapshot.profile.is_none());
    }

    #[test]
    fn test_demo_flag_follows_identity() {
        let mut snapshot = SessionSnapshot::unresolved(AppMode::Demo);
        snapshot.resolve(Some(demo_identity()), Some(demo_profile()));
        assert!(snapshot.is_demo);

        snapshot.clear_identity();
        assert!(!snapshot.is_demo);
        assert_eq!(snapshot.mode, AppMode::Demo);
        assert!(!snapshot.loading);
    }
}
