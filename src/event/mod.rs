// Type-keyed publish/subscribe
//
// This module provides the subscription registry: handlers are registered
// per event type and invoked synchronously by whoever publishes that type.

// Public API - what other modules can use
pub use bus::SubscriptionRegistry;
pub use handler::{EventError, HandlerFn};
pub use subscription::{Subscription, SubscriptionId, SubscriptionToken};

// Internal modules
mod bus;
mod handler;
mod subscription;
