use std::sync::{Arc, Mutex};

// ============================================================================
// Test Events
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Ping {
    pub seq: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pong;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Shared log that handlers append labels to, in invocation order
#[derive(Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that records `label` each time it runs
    pub fn handler<E: 'static>(&self, label: &str) -> impl Fn(&E) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        let label = label.to_string();
        move |_: &E| entries.lock().unwrap().push(label.clone())
    }

    pub fn record(&self, label: impl Into<String>) {
        self.entries.lock().unwrap().push(label.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    #[allow(dead_code)] // not every test binary resets its sink
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
