//! Operator-facing error types for queue operations.

use thiserror::Error;

/// Errors surfaced synchronously to callers of queue operations.
///
/// Device-level failures never appear here: they are absorbed into the
/// owning [`QueueItem`](crate::item::QueueItem) and observed later through
/// [`status`](crate::queue::UpdateQueue::status).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A batch is already active; only one may run at a time.
    #[error("an update batch is already running")]
    AlreadyRunning,

    /// Results cannot be cleared while a batch is active.
    #[error("cannot clear results while updates are running")]
    StillRunning,

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl QueueError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            QueueError::AlreadyRunning.to_string(),
            "an update batch is already running"
        );
        assert!(QueueError::StillRunning.to_string().contains("clear"));

        let err = QueueError::invalid_configuration("poll_interval must be nonzero");
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn test_error_constructors() {
        let err = QueueError::invalid_configuration("bad");
        assert!(matches!(err, QueueError::InvalidConfiguration(_)));
    }
}
