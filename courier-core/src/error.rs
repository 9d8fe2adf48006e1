//! Error types for dispatch operations.

use crate::message::{MessageKind, MessageType};
use thiserror::Error;

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Error returned by a handler's own logic.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler logic failed
    #[error("Handler failed: {0}")]
    Failed(String),

    /// Message rejected by validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested data does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Handler observed cancellation and gave up
    #[error("Handler cancelled")]
    Cancelled,

    /// Any other error raised by the handler
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a `Failed` error from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }

    /// Wrap an arbitrary error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HandlerError::Other(Box::new(error))
    }
}

/// Dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler bound to the message type
    #[error("No handler registered for {kind} '{message_type}'")]
    HandlerNotFound {
        kind: MessageKind,
        message_type: &'static str,
    },

    /// The handler ran and returned an error
    #[error(transparent)]
    HandlerFailed(#[from] HandlerError),

    /// A type-erased handler received a message of another type
    #[error("Type mismatch while dispatching '{message_type}'")]
    TypeMismatch { message_type: &'static str },
}

impl DispatchError {
    pub(crate) fn not_found(message_type: MessageType) -> Self {
        DispatchError::HandlerNotFound {
            kind: message_type.kind(),
            message_type: message_type.name(),
        }
    }

    /// Whether the error reports a missing handler.
    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, DispatchError::HandlerNotFound { .. })
    }

    /// Recover the error returned by the handler, if any.
    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            DispatchError::HandlerFailed(err) => Some(err),
            _ => None,
        }
    }
}
