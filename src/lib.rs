// Library crate for the typebus event registry
// This file exposes the public API for the demo binary and integration tests

pub mod event;

// Re-export commonly used types for easier access
pub use event::{
    EventError, HandlerFn, Subscription, SubscriptionId, SubscriptionRegistry, SubscriptionToken,
};
