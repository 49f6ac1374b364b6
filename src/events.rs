//! Typed event fan-out for playerkit
//!
//! Each producer owns one [`EventHub`] per event type and notifies every
//! subscriber synchronously, in subscription order. Subscribing returns an
//! RAII [`Subscription`] handle; dropping the handle removes the subscriber,
//! which is how observer lifetimes are tied to engine attachments.

use parking_lot::Mutex;
use std::sync::Arc;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A list of typed subscribers
pub struct EventHub<E> {
    inner: Arc<Mutex<HubInner<E>>>,
}

struct HubInner<E> {
    next_id: u64,
    subscribers: Vec<(u64, Callback<E>)>,
}

impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Send + 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> EventHub<E> {
    /// Create a hub with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a subscriber; it stays registered until the returned
    /// [`Subscription`] is dropped or cancelled
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::new(callback)));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(hub) = weak.upgrade() {
                    hub.lock().subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    /// Notify every subscriber, in subscription order
    ///
    /// The subscriber list is snapshotted before the callbacks run, so a
    /// callback may subscribe or unsubscribe without deadlocking the hub.
    pub fn emit(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self
            .inner
            .lock()
            .subscribers
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// RAII handle for one hub subscription
///
/// Dropping the handle removes the subscriber from the hub. Outliving the hub
/// is fine; cancellation then becomes a no-op.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Remove the subscriber now instead of at drop time
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}
