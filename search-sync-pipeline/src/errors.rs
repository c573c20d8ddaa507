//! Error types for the sync pipeline.

use std::time::Duration;

use thiserror::Error;

use search_sync_repository::{ProvisioningError, SearchServiceError};

/// Errors raised while running an indexer or a sync workflow.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// The indexer reached a terminal state other than success.
    #[error("Indexer '{indexer}' run failed: {message}")]
    RunFailed { indexer: String, message: String },

    #[error("Indexer '{indexer}' did not finish within {timeout:?}")]
    Timeout { indexer: String, timeout: Duration },

    #[error("Indexer '{indexer}' run was cancelled")]
    Cancelled { indexer: String },

    /// A run request or status poll failed outright.
    #[error("Indexer '{indexer}' service error: {source}")]
    Service {
        indexer: String,
        #[source]
        source: SearchServiceError,
    },

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}

impl SyncError {
    pub fn run_failed(indexer: &str, message: impl Into<String>) -> Self {
        Self::RunFailed {
            indexer: indexer.to_string(),
            message: message.into(),
        }
    }

    pub fn timeout(indexer: &str, timeout: Duration) -> Self {
        Self::Timeout {
            indexer: indexer.to_string(),
            timeout,
        }
    }

    pub fn cancelled(indexer: &str) -> Self {
        Self::Cancelled {
            indexer: indexer.to_string(),
        }
    }

    pub fn service(indexer: &str, source: SearchServiceError) -> Self {
        Self::Service {
            indexer: indexer.to_string(),
            source,
        }
    }
}

/// Errors returned by the query facade.
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// The term was rejected before a request was sent.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The service answered a facet request without the requested facet.
    #[error("Facet '{0}' missing from response")]
    MissingFacet(String),

    #[error(transparent)]
    Service(#[from] SearchServiceError),
}

impl QueryError {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}
