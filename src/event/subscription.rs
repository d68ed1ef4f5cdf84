use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use uuid::Uuid;

/// Unique identity of one registration
///
/// Two subscriptions with identical handlers still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to a handler registered for events of type `E`
///
/// Returned by `subscribe`; pass it back to `unsubscribe` to cancel the
/// registration. Dropping the handle does not cancel anything.
pub struct Subscription<E> {
    id: SubscriptionId,
    _event: PhantomData<fn(&E)>,
}

impl<E: 'static> Subscription<E> {
    pub(crate) fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            _event: PhantomData,
        }
    }

    /// Erase the event type, keeping enough to cancel the registration later
    pub fn token(&self) -> SubscriptionToken {
        SubscriptionToken {
            event_type: TypeId::of::<E>(),
            event_name: any::type_name::<E>(),
            id: self.id,
        }
    }
}

impl<E> Subscription<E> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

// Manual impls: derives would demand `E: Clone` / `E: Debug`.
impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            _event: PhantomData,
        }
    }
}

impl<E> PartialEq for Subscription<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for Subscription<E> {}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &any::type_name::<E>())
            .field("id", &self.id)
            .finish()
    }
}

/// Type-erased subscription handle
///
/// Lets code that does not know the event type cancel a registration. It
/// records the event type so the registry can still find the right bucket.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionToken {
    event_type: TypeId,
    event_name: &'static str,
    id: SubscriptionId,
}

impl SubscriptionToken {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// Name of the event type, for diagnostics only
    pub fn event_name(&self) -> &'static str {
        self.event_name
    }
}

// Identity is the registry's removal key; `event_name` is display only.
impl PartialEq for SubscriptionToken {
    fn eq(&self, other: &Self) -> bool {
        self.event_type == other.event_type && self.id == other.id
    }
}

impl Eq for SubscriptionToken {}

impl Hash for SubscriptionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.event_type.hash(state);
        self.id.hash(state);
    }
}

impl<E: 'static> From<Subscription<E>> for SubscriptionToken {
    fn from(subscription: Subscription<E>) -> Self {
        subscription.token()
    }
}

impl<E: 'static> From<&Subscription<E>> for SubscriptionToken {
    fn from(subscription: &Subscription<E>) -> Self {
        subscription.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Ping;
    struct Pong;

    #[test]
    fn test_token_records_event_type() {
        let subscription = Subscription::<Ping>::new(SubscriptionId::new());
        let token = subscription.token();

        assert_eq!(token.event_type(), TypeId::of::<Ping>());
        assert_ne!(token.event_type(), TypeId::of::<Pong>());
        assert_eq!(token.id(), subscription.id());
        assert!(token.event_name().ends_with("Ping"));
    }

    #[test]
    fn test_ids_are_distinct() {
        let first = Subscription::<Ping>::new(SubscriptionId::new());
        let second = Subscription::<Ping>::new(SubscriptionId::new());

        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn test_token_identity_ignores_event_name() {
        let id = SubscriptionId::new();
        let token = Subscription::<Ping>::new(id).token();
        let renamed = SubscriptionToken {
            event_name: "renamed",
            ..token
        };

        assert_eq!(token, renamed);

        let mut tokens = HashSet::new();
        tokens.insert(token);
        assert!(!tokens.insert(renamed));

        let other_type = Subscription::<Pong>::new(id).token();
        assert_ne!(token, other_type);
    }

    #[test]
    fn test_id_needs_no_static_bound() {
        fn id_of<E>(subscription: &Subscription<E>) -> SubscriptionId {
            subscription.id()
        }

        let subscription = Subscription::<Ping>::new(SubscriptionId::new());
        assert_eq!(id_of(&subscription), subscription.token().id());
    }

    #[test]
    fn test_from_conversions_agree() {
        let subscription = Subscription::<Ping>::new(SubscriptionId::new());
        let by_ref = SubscriptionToken::from(&subscription);
        let by_value: SubscriptionToken = subscription.into();

        assert_eq!(by_ref, by_value);
    }
}
