//! Profile store trait.

use super::model::{Profile, ProfileUpdate};
use crate::error::Result;

/// Abstract access to stored user profiles.
#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile of the given user.
    ///
    /// Returns `Ok(None)` when no profile row exists.
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// Updates the provided fields of the user's profile.
    async fn update(&self, id: &str, update: &ProfileUpdate) -> Result<()>;
}
