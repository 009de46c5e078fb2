//! Identity and remote session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport-level credentials issued by the remote auth service.
///
/// Opaque to the session manager; only the auth client reads it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    /// True when the access token has expired at `now`.
    ///
    /// Tokens without an expiry never expire locally.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

// Tokens must never reach log output.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// User record as returned by the remote auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session held by the remote auth client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: SessionToken,
}

impl AuthSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.token.is_expired_at(now)
    }
}

/// The authenticated actor as seen by consumers of the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    /// Present in live mode only.
    #[serde(skip)]
    pub token: Option<SessionToken>,
}

impl Identity {
    /// Creates an identity without transport credentials.
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
            token: None,
        }
    }
}

impl From<&AuthSession> for Identity {
    fn from(session: &AuthSession) -> Self {
        Self {
            id: session.user.id.clone(),
            email: session.user.email.clone(),
            token: Some(session.token.clone()),
        }
    }
}

/// Kind of auth state change reported by the remote client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A change notification: the event plus the session in effect after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

impl AuthChange {
    pub fn new(event: AuthEvent, session: Option<AuthSession>) -> Self {
        Self { event, session }
    }
}

/// Extra attributes recorded with a new account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpAttributes {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Result of a successful sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The service confirmed the account immediately and issued a session.
    SignedIn(AuthSession),
    /// The account exists but must be confirmed by email before sign-in.
    ConfirmationRequired,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: Option<DateTime<Utc>>) -> SessionToken {
        SessionToken {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        assert!(token(Some(now - Duration::seconds(1))).is_expired_at(now));
        assert!(!token(Some(now + Duration::hours(1))).is_expired_at(now));
        assert!(!token(None).is_expired_at(now));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let rendered = format!("{:?}", token(None));
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
    }

    #[test]
    fn test_identity_from_session() {
        let session = AuthSession {
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some("ana@example.com".to_string()),
            },
            token: token(None),
        };
        let identity = Identity::from(&session);
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
        assert!(identity.token.is_some());
    }
}
