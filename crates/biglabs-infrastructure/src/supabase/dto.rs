//! GoTrue request and response bodies.

use biglabs_core::auth::{AuthSession, AuthUser, SessionToken, SignUpAttributes};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a SignUpAttributes,
}

#[derive(Serialize)]
pub(crate) struct RecoverRequest<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<UserDto> for AuthUser {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Body of a successful token grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserDto,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        AuthSession {
            user: self.user.into(),
            token: SessionToken {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_at,
            },
        }
    }
}

/// Sign-up returns a session when auto-confirm is on, otherwise the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(TokenResponse),
    User(UserDto),
}
