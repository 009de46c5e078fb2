//! `RemoteAuthClient` backed by the Supabase GoTrue API.

use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use biglabs_core::auth::{
    AuthChange, AuthChangeStream, AuthEvent, AuthSession, RemoteAuthClient, SignUpAttributes,
    SignUpOutcome,
};
use biglabs_core::{BiglabsError, Result};
use chrono::{Duration, Utc};
use reqwest::Method;
use tokio::sync::mpsc;

use super::dto::{
    PasswordGrant, RecoverRequest, RefreshGrant, SignUpRequest, SignUpResponse, TokenResponse,
    UpdateUserRequest, UserDto,
};
use super::http::SupabaseHttp;
use crate::storage::SessionStorage;

/// Access tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 10;

/// GoTrue client that owns the session token lifecycle.
///
/// The current session lives in memory and, when storage is configured, in
/// `session.json` so it survives restarts. Every change is broadcast to
/// subscribers in the order it was applied.
pub struct SupabaseAuthClient {
    http: SupabaseHttp,
    storage: Option<SessionStorage>,
    session: RwLock<Option<AuthSession>>,
    /// Serializes token refreshes with each other and with sign-out, so a
    /// refresh token is spent once and a refresh never outlives a sign-out.
    refresh_lock: tokio::sync::Mutex<()>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AuthChange>>>,
}

impl SupabaseAuthClient {
    /// Creates a client, restoring any persisted session from `storage`.
    pub fn new(http: SupabaseHttp, storage: Option<SessionStorage>) -> Self {
        let persisted = storage.as_ref().and_then(|storage| match storage.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[SupabaseAuth] Ignoring unreadable session file: {}", e);
                None
            }
        });

        if let Some(session) = &persisted {
            tracing::debug!("[SupabaseAuth] Restored session for user {}", session.user.id);
        }

        Self {
            http,
            storage,
            session: RwLock::new(persisted),
            refresh_lock: tokio::sync::Mutex::new(()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Returns a valid access token for the signed-in user, refreshing if needed.
    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .current_session()
            .await?
            .map(|session| session.token.access_token))
    }

    fn stored_session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn needs_refresh(session: &AuthSession) -> bool {
        session.is_expired_at(Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    /// Replaces the session, persists it and notifies subscribers.
    fn set_session(&self, event: AuthEvent, session: Option<AuthSession>) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session.clone();

        if let Some(storage) = &self.storage {
            let persisted = match &session {
                Some(session) => storage.save(session),
                None => storage.clear(),
            };
            if let Err(e) = persisted {
                tracing::warn!("[SupabaseAuth] Failed to persist session: {}", e);
            }
        }

        self.emit(AuthChange::new(event, session));
    }

    fn emit(&self, change: AuthChange) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }

    async fn refresh(&self, expired: AuthSession) -> Result<Option<AuthSession>> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        match self.stored_session() {
            Some(current) if current.token != expired.token => return Ok(Some(current)),
            None => return Ok(None),
            Some(_) => {}
        }

        tracing::debug!("[SupabaseAuth] Refreshing session for user {}", expired.user.id);
        let request = self
            .http
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrant {
                refresh_token: &expired.token.refresh_token,
            });

        let refreshed = self.http.send_json::<TokenResponse>(request).await;

        // A sign-in may have replaced the session while the request was out.
        match self.stored_session() {
            Some(current) if current.token != expired.token => return Ok(Some(current)),
            None => return Ok(None),
            Some(_) => {}
        }

        match refreshed {
            Ok(response) => {
                let session = response.into_session(Utc::now());
                self.set_session(AuthEvent::TokenRefreshed, Some(session.clone()));
                Ok(Some(session))
            }
            Err(e) if e.is_auth() => {
                tracing::info!("[SupabaseAuth] Refresh token rejected, signing out: {}", e);
                self.set_session(AuthEvent::SignedOut, None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RemoteAuthClient for SupabaseAuthClient {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        match self.stored_session() {
            Some(session) if Self::needs_refresh(&session) => self.refresh(session).await,
            session => Ok(session),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = self
            .http
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password });

        let session = self
            .http
            .send_json::<TokenResponse>(request)
            .await?
            .into_session(Utc::now());

        tracing::info!("[SupabaseAuth] Signed in user {}", session.user.id);
        self.set_session(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: SignUpAttributes,
    ) -> Result<SignUpOutcome> {
        let request = self
            .http
            .request(Method::POST, "auth/v1/signup", None)
            .json(&SignUpRequest {
                email,
                password,
                data: &attributes,
            });

        match self.http.send_json::<SignUpResponse>(request).await? {
            SignUpResponse::Session(response) => {
                let session = response.into_session(Utc::now());
                tracing::info!("[SupabaseAuth] Signed up and signed in user {}", session.user.id);
                self.set_session(AuthEvent::SignedIn, Some(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!("[SupabaseAuth] Signed up user {}, confirmation pending", user.id);
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        // Waits out an in-flight refresh so its result cannot restore the session.
        let _guard = self.refresh_lock.lock().await;
        let Some(session) = self.stored_session() else {
            return Ok(());
        };

        let request = self.http.request(
            Method::POST,
            "auth/v1/logout",
            Some(&session.token.access_token),
        );
        let revoked = self.http.send_empty(request).await;

        // The local session ends even when revocation fails.
        self.set_session(AuthEvent::SignedOut, None);
        tracing::info!("[SupabaseAuth] Signed out user {}", session.user.id);

        revoked
    }

    async fn update_password(&self, new_password: &str) -> Result<()> {
        let session = self
            .current_session()
            .await?
            .ok_or_else(|| BiglabsError::auth("Not signed in"))?;

        let request = self
            .http
            .request(Method::PUT, "auth/v1/user", Some(&session.token.access_token))
            .json(&UpdateUserRequest {
                password: new_password,
            });
        let user: UserDto = self.http.send_json(request).await?;

        let updated = AuthSession {
            user: user.into(),
            token: session.token,
        };
        self.set_session(AuthEvent::UserUpdated, Some(updated));
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, "auth/v1/recover", None)
            .json(&RecoverRequest { email });
        self.http.send_empty(request).await
    }

    fn subscribe(&self) -> AuthChangeStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(sender);
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biglabs_core::auth::{AuthUser, SessionToken};
    use biglabs_core::config::SupabaseConfig;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    const REFRESHED_BODY: &str = r#"{
        "access_token": "access-2",
        "refresh_token": "refresh-2",
        "expires_in": 3600,
        "user": { "id": "user-1", "email": "user@example.com" }
    }"#;

    fn http_to(url: &str) -> SupabaseHttp {
        SupabaseHttp::new(
            &SupabaseConfig {
                url: url.to_string(),
                anon_key: "anon".to_string(),
            },
            std::time::Duration::from_secs(2),
        )
        .unwrap()
    }

    /// Nothing listens on port 1, so every request fails at connect time.
    fn unreachable_http() -> SupabaseHttp {
        http_to("http://127.0.0.1:1")
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buffer);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let line = line.to_ascii_lowercase();
                        line.strip_prefix("content-length:")
                            .and_then(|value| value.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if buffer.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Local GoTrue stand-in. Token grants signal `received` on arrival and
    /// are answered only after `release` fires; other calls get 204.
    async fn gated_token_endpoint(
        received: oneshot::Sender<()>,
        release: oneshot::Receiver<()>,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Some(received)));
        let release = Arc::new(tokio::sync::Mutex::new(Some(release)));

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let received = received.clone();
                let release = release.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let (status, body) = if request.starts_with("POST /auth/v1/token") {
                        let sender = received.lock().unwrap().take();
                        if let Some(sender) = sender {
                            let _ = sender.send(());
                        }
                        let gate = release.lock().await.take();
                        if let Some(gate) = gate {
                            let _ = gate.await;
                        }
                        ("200 OK", REFRESHED_BODY)
                    } else {
                        ("204 No Content", "")
                    };
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                });
            }
        });

        format!("http://{addr}")
    }

    fn session(expires_in: Duration) -> AuthSession {
        AuthSession {
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some("user@example.com".to_string()),
            },
            token: SessionToken {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Some(Utc::now() + expires_in),
            },
        }
    }

    fn persisted_client(temp_dir: &TempDir, saved: &AuthSession) -> SupabaseAuthClient {
        let storage = SessionStorage::with_path(temp_dir.path().join("session.json"));
        storage.save(saved).unwrap();
        SupabaseAuthClient::new(unreachable_http(), Some(storage))
    }

    #[tokio::test]
    async fn test_no_session_without_storage() {
        let client = SupabaseAuthClient::new(unreachable_http(), None);
        assert_eq!(client.current_session().await.unwrap(), None);
        assert_eq!(client.access_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restores_valid_persisted_session() {
        let temp_dir = TempDir::new().unwrap();
        let saved = session(Duration::hours(1));
        let client = persisted_client(&temp_dir, &saved);

        assert_eq!(client.current_session().await.unwrap(), Some(saved));
        assert_eq!(
            client.access_token().await.unwrap().as_deref(),
            Some("access")
        );
    }

    #[tokio::test]
    async fn test_unreadable_session_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let client = SupabaseAuthClient::new(unreachable_http(), Some(SessionStorage::with_path(path)));
        assert_eq!(client.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_refresh_failure_is_remote_error() {
        let temp_dir = TempDir::new().unwrap();
        let client = persisted_client(&temp_dir, &session(Duration::seconds(-60)));

        let err = client.current_session().await.unwrap_err();
        assert!(err.is_remote());
        // Transport failures do not end the session.
        assert!(client.stored_session().is_some());
    }

    #[tokio::test]
    async fn test_sign_out_clears_locally_when_revocation_fails() {
        let temp_dir = TempDir::new().unwrap();
        let client = persisted_client(&temp_dir, &session(Duration::hours(1)));
        let mut changes = client.subscribe();

        let result = client.sign_out().await;
        assert!(result.unwrap_err().is_remote());

        assert_eq!(client.current_session().await.unwrap(), None);
        assert!(!temp_dir.path().join("session.json").exists());

        let change = changes.try_recv().unwrap();
        assert_eq!(change, AuthChange::new(AuthEvent::SignedOut, None));
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_noop() {
        let client = SupabaseAuthClient::new(unreachable_http(), None);
        let mut changes = client.subscribe();

        client.sign_out().await.unwrap();
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_sign_in_emits_nothing() {
        let client = SupabaseAuthClient::new(unreachable_http(), None);
        let mut changes = client.subscribe();

        let err = client
            .sign_in_with_password("user@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let client = SupabaseAuthClient::new(unreachable_http(), None);
        let err = client.update_password("new-secret").await.unwrap_err();
        assert_eq!(err, BiglabsError::auth("Not signed in"));
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let client = persisted_client(&temp_dir, &session(Duration::hours(1)));

        drop(client.subscribe());
        let mut live = client.subscribe();
        let _ = client.sign_out().await;

        assert_eq!(live.try_recv().unwrap().event, AuthEvent::SignedOut);
        assert_eq!(client.subscribers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_during_refresh_stays_signed_out() {
        let (received_tx, received_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let base_url = gated_token_endpoint(received_tx, release_rx).await;

        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::with_path(temp_dir.path().join("session.json"));
        storage.save(&session(Duration::seconds(-60))).unwrap();
        let client = Arc::new(SupabaseAuthClient::new(http_to(&base_url), Some(storage)));
        let mut changes = client.subscribe();

        let refreshing = tokio::spawn({
            let client = client.clone();
            async move { client.current_session().await }
        });
        received_rx.await.unwrap();

        let signing_out = tokio::spawn({
            let client = client.clone();
            async move { client.sign_out().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        release_tx.send(()).unwrap();

        refreshing.await.unwrap().unwrap();
        signing_out.await.unwrap().unwrap();

        assert_eq!(client.stored_session(), None);
        assert!(!temp_dir.path().join("session.json").exists());

        let mut last = None;
        while let Ok(change) = changes.try_recv() {
            last = Some(change);
        }
        assert_eq!(last, Some(AuthChange::new(AuthEvent::SignedOut, None)));
    }
}
