pub mod mocks;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{Ping, Pong, RecordingSink};
