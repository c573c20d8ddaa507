//! Service error types.
//!
//! This module defines the errors returned by calls to the remote search
//! service, independent of which transport produced them.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling the search service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchServiceError {
    /// Failed to reach the service or build the request.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The addressed resource does not exist (HTTP 404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource already exists or is busy (HTTP 409 / 412).
    #[error("Conflict on {resource}: {message}")]
    Conflict { resource: String, message: String },

    /// The service is throttling requests (HTTP 429).
    #[error("Rate limited: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    /// Any other non-success response.
    #[error("Request failed with status {status}: {message}")]
    RequestError { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The request was rejected locally before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SearchServiceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not-found error for the given resource path.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a conflict error.
    pub fn conflict(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a rate-limited error.
    pub fn rate_limited(retry_after: Option<Duration>, msg: impl Into<String>) -> Self {
        Self::RateLimited {
            retry_after,
            message: msg.into(),
        }
    }

    /// Create a request error.
    pub fn request(status: u16, msg: impl Into<String>) -> Self {
        Self::RequestError {
            status,
            message: msg.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
