use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

use super::{
    handler::{EventError, HandlerFn},
    subscription::{Subscription, SubscriptionId, SubscriptionToken},
};

/// Concrete handler stored behind `dyn Any` so buckets of different event
/// types can share one map.
struct TypedHandler<E>(Box<HandlerFn<E>>);

struct Entry {
    id: SubscriptionId,
    /// Always a `TypedHandler<E>` for the `E` of the owning bucket
    handler: Arc<dyn Any + Send + Sync>,
}

struct Bucket {
    event_name: &'static str,
    entries: Vec<Entry>,
}

/// Type-keyed registry of event handlers
///
/// Handlers are registered per event type and invoked synchronously, in
/// subscription order, on the thread that calls [`publish`](Self::publish).
///
/// All operations lock a single mutex owned by this registry. `publish` holds
/// it only while copying the handler list for the event type; handlers run
/// after the lock is released, so they may freely subscribe, unsubscribe or
/// publish on the same registry.
///
/// Cloning yields another handle to the same registry. Use
/// [`new`](Self::new) for an independent one.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    /// event type -> subscriptions in insertion order
    buckets: Arc<Mutex<HashMap<TypeId, Bucket>>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry with its own lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every future event of type `E`
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription<E>
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.try_subscribe(move |event: &E| {
            handler(event);
            Ok(())
        })
    }

    /// Registers a fallible handler for every future event of type `E`
    ///
    /// An `Err` returned by the handler aborts the publish that invoked it
    /// and is handed to the publisher.
    pub fn try_subscribe<E, F>(&self, handler: F) -> Subscription<E>
    where
        E: 'static,
        F: Fn(&E) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let handler: Arc<dyn Any + Send + Sync> = Arc::new(TypedHandler::<E>(Box::new(handler)));

        let mut buckets = self.lock();
        let bucket = buckets.entry(TypeId::of::<E>()).or_insert_with(|| Bucket {
            event_name: any::type_name::<E>(),
            entries: Vec::new(),
        });
        bucket.entries.push(Entry { id, handler });

        debug!(
            event_type = bucket.event_name,
            subscription_id = %id,
            subscribers = bucket.entries.len(),
            "Handler subscribed"
        );

        Subscription::new(id)
    }

    /// Invokes every handler subscribed to `E`, in subscription order
    ///
    /// The handler list is captured once at the start of the call. Handlers
    /// subscribed while this publish is running are not invoked by it, and
    /// handlers cancelled while it is running still are.
    ///
    /// The first handler error stops the publish: later handlers are skipped
    /// and the error is returned. A panicking handler unwinds through this
    /// call in the same way. Publishing with no subscribers is a no-op.
    pub fn publish<E: 'static>(&self, event: &E) -> Result<(), EventError> {
        let snapshot = self.snapshot::<E>();

        if snapshot.is_empty() {
            debug!(
                event_type = any::type_name::<E>(),
                "Event published with no subscribers"
            );
            return Ok(());
        }

        trace!(
            event_type = any::type_name::<E>(),
            handlers = snapshot.len(),
            "Publishing event"
        );

        for (position, handler) in snapshot.iter().enumerate() {
            if let Err(e) = (handler.0)(event) {
                warn!(
                    event_type = any::type_name::<E>(),
                    error = %e,
                    skipped = snapshot.len() - position - 1,
                    "Handler failed, aborting publish"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    /// Cancels `subscription`
    ///
    /// Cancelling twice, or cancelling a subscription that belongs to another
    /// registry, does nothing.
    pub fn unsubscribe<E: 'static>(&self, subscription: &Subscription<E>) {
        self.remove(TypeId::of::<E>(), subscription.id());
    }

    /// Cancels the subscription behind a type-erased token
    ///
    /// Same semantics as [`unsubscribe`](Self::unsubscribe).
    pub fn unsubscribe_token(&self, token: &SubscriptionToken) {
        self.remove(token.event_type(), token.id());
    }

    /// Number of active subscriptions for events of type `E`
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.lock()
            .get(&TypeId::of::<E>())
            .map_or(0, |bucket| bucket.entries.len())
    }

    /// Number of active subscriptions across all event types
    pub fn len(&self) -> usize {
        self.lock().values().map(|bucket| bucket.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the subscription behind `token` is still active
    pub fn contains(&self, token: &SubscriptionToken) -> bool {
        self.lock()
            .get(&token.event_type())
            .is_some_and(|bucket| bucket.entries.iter().any(|entry| entry.id == token.id()))
    }

    /// Copies the handlers for `E` while holding the lock
    fn snapshot<E: 'static>(&self) -> Vec<Arc<TypedHandler<E>>> {
        let buckets = self.lock();

        let Some(bucket) = buckets.get(&TypeId::of::<E>()) else {
            return Vec::new();
        };

        bucket
            .entries
            .iter()
            .filter_map(|entry| Arc::clone(&entry.handler).downcast::<TypedHandler<E>>().ok())
            .collect()
    }

    fn remove(&self, event_type: TypeId, id: SubscriptionId) {
        let mut buckets = self.lock();

        // Emptied buckets stay in the map; they are reused by the next subscribe.
        let Some(bucket) = buckets.get_mut(&event_type) else {
            trace!(subscription_id = %id, "Unsubscribe for unknown event type ignored");
            return;
        };

        let Some(position) = bucket.entries.iter().position(|entry| entry.id == id) else {
            trace!(
                event_type = bucket.event_name,
                subscription_id = %id,
                "Unsubscribe for inactive subscription ignored"
            );
            return;
        };

        bucket.entries.remove(position);

        debug!(
            event_type = bucket.event_name,
            subscription_id = %id,
            subscribers = bucket.entries.len(),
            "Handler unsubscribed"
        );
    }

    // Nothing panics while the guard is held, so a poisoned lock still
    // guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Bucket>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets = self.lock();
        let mut map = f.debug_map();
        for bucket in buckets.values() {
            map.entry(&bucket.event_name, &bucket.entries.len());
        }
        map.finish()
    }
}
