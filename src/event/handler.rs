use thiserror::Error;

/// Errors a handler can report back to the publisher
///
/// The registry never produces these itself; they only ever originate from
/// a subscribed handler and are handed to the caller of `publish`.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EventError {
    /// Create a failure from a plain message
    pub fn failed(msg: impl Into<String>) -> Self {
        EventError::Failed(msg.into())
    }

    /// Wrap an arbitrary error raised inside a handler
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EventError::Other(Box::new(err))
    }
}

/// Function invoked with every published event of type `E`
///
/// Handlers receive the event by reference and run on the publisher's
/// thread. Returning `Err` stops the current publish; the remaining handlers
/// of that publish are skipped.
pub type HandlerFn<E> = dyn Fn(&E) -> Result<(), EventError> + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct DiskFull;

    impl fmt::Display for DiskFull {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk full")
        }
    }

    impl std::error::Error for DiskFull {}

    #[test]
    fn test_failed_message() {
        let err = EventError::failed("boom");
        assert_eq!(err.to_string(), "Handler failed: boom");
    }

    #[test]
    fn test_other_is_transparent() {
        let err = EventError::other(DiskFull);
        assert_eq!(err.to_string(), "disk full");
        assert!(matches!(err, EventError::Other(_)));
    }
}
