//! Store change notifications.
//!
//! # Responsibility
//! - Let views and other observers learn that store data changed so
//!   they can re-run their own queries.
//! - Tie subscriber lifetime to an RAII handle instead of a global
//!   notification center.
//!
//! # Invariants
//! - Events are hints only; the store remains the single source of
//!   truth and subscribers must re-query it.
//! - Dropping a [`ChangeSubscription`] unregisters its callback; no
//!   leaked subscriptions.
//! - Dispatch is synchronous with no ordering guarantee between
//!   subscribers. Callbacks must not call back into the hub.

use crate::model::EntityKind;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use uuid::Uuid;

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    /// Bulk change (import, cascade); subscribers should re-query
    /// everything of this kind.
    Refreshed,
}

/// One change notification.
///
/// Carries just enough to decide whether a re-query is needed; `id` is
/// `None` for bulk refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub entity: EntityKind,
    pub change: ChangeKind,
    pub id: Option<Uuid>,
}

impl StoreEvent {
    pub fn new(entity: EntityKind, change: ChangeKind, id: Uuid) -> Self {
        Self {
            entity,
            change,
            id: Some(id),
        }
    }

    /// Bulk "re-query everything of this kind" hint.
    pub fn refreshed(entity: EntityKind) -> Self {
        Self {
            entity,
            change: ChangeKind::Refreshed,
            id: None,
        }
    }
}

type Callback = Box<dyn Fn(&StoreEvent) + Send>;

#[derive(Default)]
struct Registry {
    next_token: u64,
    subscribers: BTreeMap<u64, Callback>,
}

/// Observer registry for store changes.
///
/// Cheap to clone; every clone shares the same registry. Services hold
/// one handle as publisher, views hold another and subscribe.
#[derive(Clone, Default)]
pub struct ChangeHub {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one callback and returns its lifetime handle.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreEvent) + Send + 'static,
    ) -> ChangeSubscription {
        let mut registry = lock_registry(&self.registry);
        let token = registry.next_token;
        registry.next_token += 1;
        registry.subscribers.insert(token, Box::new(callback));
        ChangeSubscription {
            token,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers one event to every live subscriber.
    pub fn publish(&self, event: &StoreEvent) {
        let registry = lock_registry(&self.registry);
        for callback in registry.subscribers.values() {
            callback(event);
        }
    }

    /// Number of live subscriptions, for diagnostics.
    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).subscribers.len()
    }
}

/// RAII subscription handle; dropping it unregisters the callback.
pub struct ChangeSubscription {
    token: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry).subscribers.remove(&self.token);
        }
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A poisoned registry only means a subscriber panicked mid-dispatch;
    // the map itself stays usable.
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{ChangeHub, ChangeKind, StoreEvent};
    use crate::model::EntityKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn publish_reaches_every_subscriber() {
        let hub = ChangeHub::new();
        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));

        let count_a = Arc::clone(&seen_a);
        let count_b = Arc::clone(&seen_b);
        let _sub_a = hub.subscribe(move |_| {
            count_a.fetch_add(1, Ordering::SeqCst);
        });
        let _sub_b = hub.subscribe(move |_| {
            count_b.fetch_add(1, Ordering::SeqCst);
        });

        hub.publish(&StoreEvent::refreshed(EntityKind::Note));
        assert_eq!(seen_a.load(Ordering::SeqCst), 1);
        assert_eq!(seen_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_one_registry() {
        let hub = ChangeHub::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&seen);
        let _subscription = hub.subscribe(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });

        let publisher = hub.clone();
        publisher.publish(&StoreEvent::refreshed(EntityKind::Category));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let hub = ChangeHub::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&seen);
        let subscription = hub.subscribe(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hub.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(hub.subscriber_count(), 0);

        hub.publish(&StoreEvent {
            entity: EntityKind::Category,
            change: ChangeKind::Updated,
            id: None,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
