//! Error types for queued delivery.

use courier_core::DispatchError;
use thiserror::Error;
use uuid::Uuid;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue-specific errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The consuming side is gone, nothing will read the event
    #[error("Event queue is closed")]
    Closed,

    /// A subscriber failed and the loop is configured to stop on errors
    #[error("Subscriber failed for '{message_type}' ({event_id}), {abandoned} events abandoned")]
    SubscriberFailed {
        message_type: &'static str,
        event_id: Uuid,
        /// Envelopes still queued when the loop stopped
        abandoned: u64,
        #[source]
        source: DispatchError,
    },

    /// The spawned loop task panicked or was aborted
    #[error("Consumption loop task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
