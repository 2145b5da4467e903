//! Synchronous event emitter.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// Listener callback stored by the emitter.
type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Synchronous in-process event emitter.
///
/// Listeners are invoked in subscription order, on the thread that calls
/// [`Emitter::emit`]. The listener list is snapshotted before dispatch, so a
/// listener may subscribe further listeners without deadlocking.
pub struct Emitter<E> {
    listeners: RwLock<Vec<Listener<E>>>,
}

impl<E> Emitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe a listener.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Emit an event to every subscribed listener.
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self.listeners.read().clone();
        for listener in &listeners {
            listener(event);
        }
    }

    /// Remove all listeners.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Change notification published by a [`Model`](crate::Model).
///
/// A single mutating call publishes one [`ChangeEvent::ChangedKey`] per
/// attribute whose value actually changed, followed by one aggregate
/// [`ChangeEvent::Changed`] carrying only the changed attributes. Removals
/// are reported with [`Value::Null`] as the new value.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// One or more attributes changed in a single mutating call.
    Changed {
        /// The attributes that changed, with their new values.
        changes: Map<String, Value>,
    },

    /// A single attribute changed value.
    ChangedKey {
        /// Attribute key.
        key: String,
        /// New value. [`Value::Null`] when the attribute was removed.
        new: Value,
        /// Previous value, if the attribute existed before.
        old: Option<Value>,
    },

    /// All attributes were cleared.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn emits_to_all_listeners_in_order() {
        let emitter: Emitter<u32> = Emitter::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        let first = seen.clone();
        emitter.on(move |n| first.write().push(("first", *n)));
        let second = seen.clone();
        emitter.on(move |n| second.write().push(("second", *n)));

        emitter.emit(&7);

        assert_eq!(*seen.read(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn clear_removes_listeners() {
        let emitter: Emitter<()> = Emitter::new();
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        emitter.on(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(emitter.listener_count(), 1);
        emitter.clear();
        assert_eq!(emitter.listener_count(), 0);

        emitter.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let emitter: Arc<Emitter<()>> = Arc::new(Emitter::new());
        let inner = emitter.clone();
        emitter.on(move |_| inner.on(|_| {}));

        emitter.emit(&());
        assert_eq!(emitter.listener_count(), 2);
    }
}
