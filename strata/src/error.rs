//! Error types for layer operations.

use std::any::Any;

use thiserror::Error;
use tokio::task::JoinError;

/// Failure reported by a [`LayerManager`](crate::LayerManager) operation.
///
/// None of these are fatal. An operation that fails leaves no partial
/// attachment behind and reports the error to its caller, the log, and the
/// optional error handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// The template is neither cached nor fetchable.
    #[error("template not found: {id}")]
    ResourceNotFound {
        /// Full template id that was looked up.
        id: String,
    },

    /// A tag or template id was empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// The instance being waited on was discarded by a hard reset
    /// instead of being closed.
    #[error("instance was discarded before it closed")]
    Abandoned,

    /// A background task driving the operation panicked.
    #[error("background task failed: {message}")]
    TaskFailed {
        /// Panic message extracted from the payload.
        message: String,
    },
}

impl LayerError {
    /// Create a not-found error for the given template id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::ResourceNotFound { id: id.into() }
    }
}

impl From<JoinError> for LayerError {
    fn from(err: JoinError) -> Self {
        let message = if err.is_panic() {
            extract_panic_message(&err.into_panic())
        } else {
            "task was cancelled".to_string()
        };
        Self::TaskFailed { message }
    }
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can carry either `&str` or `String` payloads. Anything else
/// falls back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Reject empty identifiers.
pub(crate) fn require_id(id: &str) -> Result<(), LayerError> {
    if id.is_empty() {
        Err(LayerError::EmptyIdentifier)
    } else {
        Ok(())
    }
}
