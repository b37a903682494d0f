//! Change signals between writers and derived views.
//!
//! Writers publish a [`Topic`] after a successful mutation; views that derive
//! data from those records (reminders, analytics) subscribe and rebuild.
//! A subscription lives exactly as long as the [`Subscription`] guard the
//! caller holds: dropping the guard unsubscribes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Medical events were created, edited or deleted
    EventsChanged,
    /// The signed-in owner or their profile changed
    UserChanged,
}

type Callback = Arc<dyn Fn(Topic) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<Topic, Vec<(u64, Callback)>>,
}

/// Publish/subscribe hub, cheap to clone and share.
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `topic` until the returned guard is dropped.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .entry(topic)
            .or_default()
            .push((id, Arc::new(callback)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            topic,
            id,
        }
    }

    /// Notify every current subscriber of `topic`. Returns how many were called.
    pub fn publish(&self, topic: Topic) -> usize {
        // Callbacks run outside the lock so they may subscribe or publish.
        let callbacks: Vec<Callback> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .subscribers
                .get(&topic)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        tracing::debug!(?topic, subscribers = callbacks.len(), "publishing change");
        for callback in &callbacks {
            callback(topic);
        }
        callbacks.len()
    }

    /// Number of live subscriptions for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

/// Guard for one subscription.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subs) = registry.subscribers.get_mut(&self.topic) {
            subs.retain(|(id, _)| *id != self.id);
        }
    }
}
