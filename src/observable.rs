//! Change-notifying state containers.
//!
//! [`Observable`] holds a value that views read and follow; [`EventHook`]
//! carries at most one listener for raw events that should reach a non-view
//! observer (e.g. the score tracker listening to heartbeat readings).

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Token returned by [`Observable::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// A value whose changes are pushed to subscribed listeners.
///
/// Listeners run synchronously on the mutating thread, in subscription order,
/// after the new value is stored. They are called without any internal lock
/// held, so a listener may read the observable (or subscribe others).
///
/// The version is incremented each time the value changes, like the
/// change-detection counters on the bridge sensors.
pub struct Observable<T> {
    value: RwLock<T>,
    version: AtomicU32,
    next_token: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionToken, Listener<T>)>>,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            version: AtomicU32::new(0),
            next_token: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Get a copy of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Number of changes since construction.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Store a new value. Listeners are notified only if the value changed.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        self.update(|_| Some(value))
    }

    /// Compute a replacement from the current value under the write lock.
    ///
    /// `f` returning `None` (or the same value) leaves the observable
    /// untouched. Listeners run after the lock is released. Returns `true`
    /// if the value changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let value = {
            let mut current = self.value.write();
            match f(&*current) {
                Some(next) if next != *current => {
                    *current = next.clone();
                    next
                }
                _ => return false,
            }
        };
        self.version.fetch_add(1, Ordering::SeqCst);
        self.notify(&value);
        true
    }

    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    /// Register a listener for future changes.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionToken
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().push((token, Arc::new(listener)));
        token
    }

    /// Remove a listener. Returns `false` if the token was unknown.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(t, _)| *t != token);
        listeners.len() != before
    }
}

/// Single-slot event hook.
///
/// Registering a listener replaces the previous one.
pub struct EventHook<T> {
    listener: RwLock<Option<Listener<T>>>,
}

impl<T> EventHook<T> {
    pub fn new() -> Self {
        Self {
            listener: RwLock::new(None),
        }
    }

    pub fn register_listener<F>(&self, listener: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        *self.listener.write() = Some(Arc::new(listener));
    }

    pub fn clear(&self) {
        *self.listener.write() = None;
    }

    pub fn is_registered(&self) -> bool {
        self.listener.read().is_some()
    }

    /// Invoke the listener, if any.
    pub fn notify(&self, value: &T) {
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener(value);
        }
    }
}

impl<T> Default for EventHook<T> {
    fn default() -> Self {
        Self::new()
    }
}
