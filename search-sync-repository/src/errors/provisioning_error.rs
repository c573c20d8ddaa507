//! Provisioning error types.

use thiserror::Error;

use super::SearchServiceError;

/// Errors raised while creating, updating, or deleting remote resources.
#[derive(Error, Debug, Clone)]
pub enum ProvisioningError {
    /// A resource definition was rejected before any remote call.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Index '{name}' provisioning failed: {source}")]
    Index {
        name: String,
        #[source]
        source: SearchServiceError,
    },

    #[error("Data source '{name}' provisioning failed: {source}")]
    DataSource {
        name: String,
        #[source]
        source: SearchServiceError,
    },

    #[error("Indexer '{name}' provisioning failed: {source}")]
    Indexer {
        name: String,
        #[source]
        source: SearchServiceError,
    },
}

impl ProvisioningError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn index(name: &str, source: SearchServiceError) -> Self {
        Self::Index {
            name: name.to_string(),
            source,
        }
    }

    pub fn data_source(name: &str, source: SearchServiceError) -> Self {
        Self::DataSource {
            name: name.to_string(),
            source,
        }
    }

    pub fn indexer(name: &str, source: SearchServiceError) -> Self {
        Self::Indexer {
            name: name.to_string(),
            source,
        }
    }
}
