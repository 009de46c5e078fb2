use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::observer::{ObserverList, Subscription};
use super::provider::{IdentityProvider, Resolution};
use super::snapshot::SessionSnapshot;
use crate::auth::Identity;
use crate::error::{BiglabsError, Result};

/// Owns the process-wide session state.
///
/// `SessionManager` is responsible for:
/// - Resolving the initial identity and profile through its provider
/// - Applying auth change notifications after the initial resolution
/// - Signing out and refreshing the profile on behalf of consumers
/// - Publishing every state transition to listeners and watchers
///
/// It never reports errors to consumers; they observe state transitions only.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionSnapshot>,
    observers: ObserverList,
    /// Held while a transition is delivered, so listeners see transitions in
    /// order and before watchers do.
    transitions: Mutex<()>,
    /// Background task running initial resolution and the change loop.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Creates the manager and starts resolving the session.
    ///
    /// Providers that can resolve without I/O are applied before this returns,
    /// so the first snapshot is already resolved. Otherwise resolution runs on a
    /// background task and the snapshot reports `loading` until it finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if background resolution is needed and no Tokio
    /// runtime is available.
    pub fn start(provider: Arc<dyn IdentityProvider>) -> Result<Arc<Self>> {
        let mode = provider.mode();
        let manager = Arc::new(Self {
            provider: provider.clone(),
            state: watch::Sender::new(SessionSnapshot::unresolved(mode)),
            observers: ObserverList::new(),
            transitions: Mutex::new(()),
            worker: Mutex::new(None),
        });

        if let Some(resolution) = provider.resolve_immediately() {
            manager.apply_resolution(resolution);
            tracing::info!("[SessionManager] Resolved immediately (mode: {})", mode);
            return Ok(manager);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            BiglabsError::internal(format!("Session manager requires a Tokio runtime: {e}"))
        })?;

        tracing::info!("[SessionManager] Resolving session (mode: {})", mode);
        let handle = runtime.spawn(Self::run(Arc::downgrade(&manager), provider));
        *lock(&manager.worker) = Some(handle);

        Ok(manager)
    }

    /// Initial resolution followed by the change loop.
    ///
    /// The change subscription is opened only after the initial resolution is
    /// visible, and notifications are applied strictly one at a time.
    async fn run(manager: Weak<Self>, provider: Arc<dyn IdentityProvider>) {
        let resolution = provider.restore().await;
        match manager.upgrade() {
            Some(manager) => manager.apply_resolution(resolution),
            None => return,
        }

        let Some(mut changes) = provider.changes().await else {
            return;
        };

        while let Some(change) = changes.recv().await {
            tracing::debug!("[SessionManager] Auth change: {:?}", change.event);
            let identity = change.session.as_ref().map(Identity::from);
            let resolution = provider.resolve_change(identity).await;

            let Some(manager) = manager.upgrade() else {
                break;
            };
            manager.apply_change(resolution);
        }

        tracing::debug!("[SessionManager] Change stream closed");
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Returns a receiver that always holds the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Waits until the initial resolution has completed.
    ///
    /// Never returns while the remote lookup is still pending.
    pub async fn wait_resolved(&self) -> SessionSnapshot {
        let mut receiver = self.state.subscribe();
        let resolved = receiver
            .wait_for(|snapshot| !snapshot.loading)
            .await
            .map(|snapshot| snapshot.clone());

        resolved.unwrap_or_else(|_| self.snapshot())
    }

    /// Registers a listener for state transitions.
    ///
    /// The listener is called once per transition, including the initial
    /// resolution. If that resolution already happened, the listener is called
    /// once right away with the current snapshot.
    ///
    /// Listeners run before the transition reaches [`snapshot`](Self::snapshot)
    /// and [`watch`](Self::watch), and must not call `subscribe` themselves.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let listener: super::observer::SessionListener = Arc::new(listener);
        let _transition = lock(&self.transitions);
        let subscription = self.observers.register(listener.clone());

        let current = self.snapshot();
        if !current.loading {
            listener(&current);
        }

        subscription
    }

    /// Signs out.
    ///
    /// The provider-side sign-out is best effort; local identity and profile
    /// are cleared whatever its outcome.
    pub async fn sign_out(&self) {
        tracing::info!("[SessionManager] Signing out");
        self.provider.sign_out().await;
        self.update(|state| state.clear_identity());
    }

    /// Reloads the profile of the current identity.
    ///
    /// Does nothing without an identity. When the load yields nothing, the
    /// stored profile is kept.
    pub async fn refresh_profile(&self) {
        let Some(identity) = self.snapshot().identity else {
            return;
        };

        let Some(profile) = self.provider.load_profile(&identity).await else {
            return;
        };

        self.update(|state| {
            // The identity may have changed while the load was in flight.
            if state.user_id() == Some(identity.id.as_str()) {
                state.profile = Some(profile);
            }
        });
    }

    /// Stops the change loop. Called at process teardown.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.worker).take() {
            handle.abort();
            tracing::debug!("[SessionManager] Shut down");
        }
    }

    fn apply_resolution(&self, resolution: Resolution) {
        self.update(|state| state.resolve(resolution.identity, resolution.profile));

        let snapshot = self.snapshot();
        match snapshot.user_id() {
            Some(user_id) => tracing::info!(
                "[SessionManager] Resolved user {} (profile loaded: {})",
                user_id,
                snapshot.profile.is_some()
            ),
            None => tracing::info!("[SessionManager] Resolved anonymous session"),
        }
    }

    fn apply_change(&self, resolution: Resolution) {
        self.update(|state| {
            // Same user (e.g. token refresh) without a fresh profile keeps the stored one.
            let profile = match (&resolution.identity, resolution.profile) {
                (Some(identity), None) if state.user_id() == Some(identity.id.as_str()) => {
                    state.profile.clone()
                }
                (_, profile) => profile,
            };
            state.resolve(resolution.identity, profile);
        });
    }

    /// Mutates the state and notifies listeners if anything changed.
    fn update(&self, mutate: impl FnOnce(&mut SessionSnapshot)) {
        let _transition = lock(&self.transitions);
        let current = self.snapshot();
        let mut next = current.clone();
        mutate(&mut next);
        if next == current {
            return;
        }

        self.observers.notify(&next);
        self.state.send_replace(next);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
