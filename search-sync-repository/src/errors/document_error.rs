//! Document batch error types.

use thiserror::Error;

use super::SearchServiceError;

/// Errors that can occur while uploading document batches.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// Validation error (e.g., missing key field).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// The service rejected the whole batch.
    #[error("Service error: {0}")]
    Service(#[from] SearchServiceError),
}

impl DocumentError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }
}
