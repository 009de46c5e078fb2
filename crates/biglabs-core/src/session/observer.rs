//! Listener registry for session snapshots.

use std::sync::{Arc, Mutex, Weak};

use super::snapshot::SessionSnapshot;

/// Callback invoked with the new snapshot after every state transition.
pub type SessionListener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, SessionListener)>,
}

/// Ordered list of registered listeners.
#[derive(Default, Clone)]
pub(crate) struct ObserverList {
    registry: Arc<Mutex<Registry>>,
}

impl ObserverList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, listener: SessionListener) -> Subscription {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, listener));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every listener with `snapshot`.
    ///
    /// Listeners run outside the registry lock, so they may subscribe or
    /// unsubscribe re-entrantly.
    pub(crate) fn notify(&self, snapshot: &SessionSnapshot) {
        let listeners: Vec<SessionListener> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

fn lock(registry: &Mutex<Registry>) -> std::sync::MutexGuard<'_, Registry> {
    // A listener that panicked cannot leave the registry half-updated.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle returned by [`SessionManager::subscribe`](super::SessionManager::subscribe).
///
/// The listener stays registered until [`Subscription::unsubscribe`] is
/// called; dropping the handle does not unregister it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Removes the listener. Safe to call after the manager is gone.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AppMode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_and_unsubscribe() {
        let observers = ObserverList::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let subscription = observers.register(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(observers.len(), 1);

        observers.notify(&SessionSnapshot::unresolved(AppMode::Live));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        subscription.unsubscribe();
        assert_eq!(observers.len(), 0);

        observers.notify(&SessionSnapshot::unresolved(AppMode::Live));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_only_removes_own_listener() {
        let observers = ObserverList::new();
        let first = observers.register(Arc::new(|_| {}));
        let _second = observers.register(Arc::new(|_| {}));

        first.unsubscribe();
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let observers = ObserverList::new();
        let subscription = observers.register(Arc::new(|_| {}));
        drop(observers);
        subscription.unsubscribe();
    }
}
