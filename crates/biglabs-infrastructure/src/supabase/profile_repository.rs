//! `ProfileRepository` backed by the PostgREST `profiles` table.

use std::sync::Arc;

use async_trait::async_trait;
use biglabs_core::Result;
use biglabs_core::user::{Profile, ProfileRepository, ProfileUpdate};
use reqwest::Method;

use super::auth_client::SupabaseAuthClient;
use super::http::SupabaseHttp;

const PROFILES_PATH: &str = "rest/v1/profiles";

/// Reads and writes rows of the `profiles` table as the signed-in user.
///
/// Row-level security scopes every request to the caller's own row, so the
/// user's access token is attached whenever one exists.
pub struct SupabaseProfileRepository {
    http: SupabaseHttp,
    auth: Arc<SupabaseAuthClient>,
}

impl SupabaseProfileRepository {
    pub fn new(http: SupabaseHttp, auth: Arc<SupabaseAuthClient>) -> Self {
        Self { http, auth }
    }
}

fn id_filter(id: &str) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let token = self.auth.access_token().await?;
        let request = self
            .http
            .request(Method::GET, PROFILES_PATH, token.as_deref())
            .query(&[id_filter(id), ("select", "*".to_string())]);

        let rows: Vec<Profile> = self.http.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn update(&self, id: &str, update: &ProfileUpdate) -> Result<()> {
        if update.is_empty() {
            tracing::debug!("[SupabaseProfiles] Skipping empty update for {}", id);
            return Ok(());
        }

        let token = self.auth.access_token().await?;
        let request = self
            .http
            .request(Method::PATCH, PROFILES_PATH, token.as_deref())
            .query(&[id_filter(id)])
            .header("Prefer", "return=minimal")
            .json(update);

        self.http.send_empty(request).await?;
        tracing::debug!("[SupabaseProfiles] Updated profile {}", id);
        Ok(())
    }
}
