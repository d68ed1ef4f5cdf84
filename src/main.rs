use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typebus::SubscriptionRegistry;

struct TestEvent;

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typebus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Creating registry");
    let registry = SubscriptionRegistry::new();

    info!("Subscribing to events");
    registry.subscribe(|_: &TestEvent| println!("TestEvent occurred"));

    info!("Publishing event");
    // Handlers have finished by the time publish returns
    if let Err(e) = registry.publish(&TestEvent) {
        error!(error = %e, "Publishing failed");
    }
}
